//! Exercises the generated bindings against the host runtime.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow, ensure};
use bindings_fixture::bindings::{self, Plugin};
use bindings_fixture::metav1::ObjectMeta;
use bindings_fixture::v1alpha1::{Cmd, CmdSpec, ConfigMap, ExecAction, HttpGetAction, Probe, Scheme};
use rstest::{fixture, rstest};
use starlark_value::{Arguments, Dict, Environment, List, Thread, Unpack, Value};

struct Host {
    env: Environment<Plugin>,
    plugin: Plugin,
    thread: Thread,
}

impl Host {
    fn call(&self, name: &str, args: &Arguments) -> Result<Value, starlark_value::Error> {
        self.env.call(&self.plugin, &self.thread, name, args)
    }

    fn only<T: Clone + 'static>(&self) -> Result<T> {
        let mut objects = self.plugin.registered::<T>();
        ensure!(objects.len() == 1, "expected one object, got {}", objects.len());
        objects.pop().ok_or_else(|| anyhow!("no object registered"))
    }
}

#[fixture]
fn host() -> Host {
    let mut env = Environment::new();
    Plugin::register_symbols(&mut env).unwrap_or_else(|err| panic!("registration failed: {err}"));
    Host {
        env,
        plugin: Plugin::new(),
        thread: Thread::new("/srv/app"),
    }
}

fn dict<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::from(Dict::from_entries(entries))
}

fn list<const N: usize>(values: [Value; N]) -> Value {
    Value::from(List::from_values(values))
}

fn strings(values: &[&str]) -> Value {
    Value::from(List::from_values(values.iter().copied()))
}

#[rstest]
fn registers_every_constructor(host: Host) {
    let names: Vec<&str> = host.env.names().collect();
    assert_eq!(
        names,
        [
            "v1alpha1.cmd",
            "v1alpha1.config_map",
            "v1alpha1.exec_action",
            "v1alpha1.http_get_action",
            "v1alpha1.probe",
            "v1alpha1.scheme",
        ]
    );
}

#[rstest]
fn cmd_round_trips_every_field_kind(host: Host) -> Result<()> {
    let args = Arguments::new()
        .with_positional("web")
        .with_named("labels", dict([("tier", Value::from("frontend"))]))
        .with_named("args", strings(&["--port", "8080"]))
        .with_named("spec_labels", dict([("team", Value::from("edge"))]))
        .with_named("dir", "work")
        .with_named("env", dict([("RUST_LOG", Value::from("debug"))]))
        .with_named("port", 8080)
        .with_named("disabled", true)
        .with_named("restart_limit", 3)
        .with_named("watch_paths", strings(&["src", "/etc/app.toml"]))
        .with_named("command", strings(&["cargo", "run"]))
        .with_named(
            "probes",
            list([dict([
                ("period_seconds", Value::Int(10)),
                (
                    "http_get",
                    dict([("host", Value::from("localhost")), ("port", Value::Int(8080))]),
                ),
            ])]),
        );
    host.call("v1alpha1.cmd", &args)?;

    let expected = Cmd {
        metadata: ObjectMeta {
            name: "web".to_owned(),
            labels: BTreeMap::from([("tier".to_owned(), "frontend".to_owned())]),
            annotations: BTreeMap::new(),
        },
        spec: CmdSpec {
            args: vec!["--port".to_owned(), "8080".to_owned()],
            labels: BTreeMap::from([("team".to_owned(), "edge".to_owned())]),
            dir: "/srv/app/work".to_owned(),
            env: BTreeMap::from([("RUST_LOG".to_owned(), "debug".to_owned())]),
            port: 8080,
            disabled: true,
            restart_limit: Some(3),
            readiness_probe: None,
            probes: vec![Probe {
                period_seconds: 10,
                http_get: Some(HttpGetAction {
                    host: "localhost".to_owned(),
                    port: 8080,
                    path: String::new(),
                    scheme: Scheme::default(),
                }),
                ..Probe::default()
            }],
            watch_paths: vec!["/srv/app/src".to_owned(), "/etc/app.toml".to_owned()],
            started_at: None,
            exec: ExecAction {
                command: vec!["cargo".to_owned(), "run".to_owned()],
            },
        },
    };
    ensure!(host.only::<Cmd>()? == expected);
    Ok(())
}

#[rstest]
fn omitted_local_path_resolves_to_the_script_directory(host: Host) -> Result<()> {
    host.call("v1alpha1.cmd", &Arguments::new().with_named("name", "bare"))?;
    let cmd = host.only::<Cmd>()?;
    ensure!(cmd.spec.dir == "/srv/app");
    ensure!(cmd.spec.readiness_probe.is_none());
    ensure!(cmd.spec.restart_limit.is_none());
    Ok(())
}

#[rstest]
#[case::omitted(None, None)]
#[case::none(Some(Value::None), None)]
#[case::empty_dict(Some(dict([])), Some(Probe::default()))]
#[case::populated(
    Some(dict([("initial_delay_seconds", Value::Int(2))])),
    Some(Probe { initial_delay_seconds: 2, ..Probe::default() })
)]
fn optional_struct_is_set_only_when_supplied(
    host: Host,
    #[case] supplied: Option<Value>,
    #[case] expected: Option<Probe>,
) -> Result<()> {
    let mut args = Arguments::new().with_named("name", "web");
    if let Some(value) = supplied {
        args = args.with_named("readiness_probe", value);
    }
    host.call("v1alpha1.cmd", &args)?;
    ensure!(host.only::<Cmd>()?.spec.readiness_probe == expected);
    Ok(())
}

#[rstest]
fn spec_labels_stay_apart_from_metadata_labels(host: Host) -> Result<()> {
    host.call(
        "v1alpha1.cmd",
        &Arguments::new()
            .with_named("name", "web")
            .with_named("labels", dict([("tier", Value::from("frontend"))]))
            .with_named("spec_labels", dict([("team", Value::from("edge"))])),
    )?;
    let cmd = host.only::<Cmd>()?;
    ensure!(cmd.metadata.labels == BTreeMap::from([("tier".to_owned(), "frontend".to_owned())]));
    ensure!(cmd.spec.labels == BTreeMap::from([("team".to_owned(), "edge".to_owned())]));
    Ok(())
}

#[rstest]
fn nested_wrappers_decode_flattened_members(host: Host) -> Result<()> {
    let action = host.call(
        "v1alpha1.http_get_action",
        &Arguments::new()
            .with_named("port", 443)
            .with_named("scheme", "https"),
    )?;
    ensure!(action.type_name() == "v1alpha1.http_get_action");

    host.call(
        "v1alpha1.cmd",
        &Arguments::new().with_named("name", "web").with_named(
            "probes",
            list([
                dict([("http_get", action)]),
                dict([("http_get", dict([("scheme", Value::from("http"))]))]),
            ]),
        ),
    )?;
    let schemes: Vec<Option<String>> = host
        .only::<Cmd>()?
        .spec
        .probes
        .into_iter()
        .map(|probe| probe.http_get.map(|action| action.scheme.scheme))
        .collect();
    ensure!(schemes == [Some("https".to_owned()), Some("http".to_owned())]);
    Ok(())
}

#[rstest]
fn nested_constructor_values_are_reused(host: Host) -> Result<()> {
    let probe = host.call(
        "v1alpha1.probe",
        &Arguments::new()
            .with_named("period_seconds", 5)
            .with_named("exec", dict([("command", strings(&["true"]))])),
    )?;
    ensure!(probe.type_name() == "v1alpha1.probe");

    host.call(
        "v1alpha1.cmd",
        &Arguments::new()
            .with_named("name", "web")
            .with_named("readiness_probe", probe.clone())
            .with_named("probes", list([probe])),
    )?;
    let spec = host.only::<Cmd>()?.spec;
    let expected = Probe {
        period_seconds: 5,
        exec: Some(ExecAction {
            command: vec!["true".to_owned()],
        }),
        ..Probe::default()
    };
    ensure!(spec.readiness_probe.as_ref() == Some(&expected));
    ensure!(spec.probes == [expected]);
    Ok(())
}

#[rstest]
fn self_referential_types_nest(host: Host) -> Result<()> {
    let fallback = dict([(
        "fallback",
        dict([("fallback", dict([("period_seconds", Value::Int(30))]))]),
    )]);
    host.call(
        "v1alpha1.cmd",
        &Arguments::new()
            .with_named("name", "web")
            .with_named("readiness_probe", fallback),
    )?;
    let probe = host
        .only::<Cmd>()?
        .spec
        .readiness_probe
        .ok_or_else(|| anyhow!("probe should be set"))?;
    let inner = probe.fallback.ok_or_else(|| anyhow!("first fallback"))?;
    let innermost = inner.fallback.ok_or_else(|| anyhow!("second fallback"))?;
    ensure!(innermost.period_seconds == 30);
    ensure!(innermost.fallback.is_none());
    Ok(())
}

#[rstest]
#[case::unknown_attribute(
    "readiness_probe",
    dict([("period", Value::Int(1))]),
    "v1alpha1.cmd: for parameter readiness_probe: unexpected attribute name: period"
)]
#[case::list_element(
    "probes",
    list([dict([]), Value::Int(3)]),
    "v1alpha1.cmd: for parameter probes: at index 1: expected dict, actual: int"
)]
#[case::nested_attribute(
    "probes",
    list([dict([("http_get", dict([("port", Value::from("80"))]))])]),
    "v1alpha1.cmd: for parameter probes: at index 0: unpacking http_get: unpacking port: expected int, actual: string"
)]
#[case::string_list(
    "args",
    list([Value::from("a"), Value::Bool(true)]),
    "v1alpha1.cmd: for parameter args: at index 1: expected string, actual: bool"
)]
#[case::flattened_member(
    "command",
    Value::from("ls"),
    "v1alpha1.cmd: for parameter command: expected list, actual: string"
)]
fn unpack_errors_carry_their_context(
    host: Host,
    #[case] param: &str,
    #[case] value: Value,
    #[case] message: &str,
) {
    let args = Arguments::new().with_named("name", "web").with_named(param, value);
    let err = host.call("v1alpha1.cmd", &args).err();
    assert_eq!(err.map(|err| err.to_string()).as_deref(), Some(message));
    assert!(host.plugin.is_empty(), "failed calls register nothing");
}

#[rstest]
fn non_string_keys_are_rejected(host: Host) {
    let key_value = Value::from(Dict::from_entries([(1_i64, Value::Int(1))]));
    let args = Arguments::new()
        .with_named("name", "web")
        .with_named("readiness_probe", key_value);
    let err = host.call("v1alpha1.cmd", &args).err();
    assert_eq!(
        err.map(|err| err.to_string()).as_deref(),
        Some("v1alpha1.cmd: for parameter readiness_probe: key must be string, got: int")
    );
}

#[rstest]
fn unpacked_containers_are_frozen(host: Host) -> Result<()> {
    let probe = Dict::from_entries([("period_seconds", Value::Int(1))]);
    let probes = List::from_values([Value::from(probe.clone())]);
    host.call(
        "v1alpha1.cmd",
        &Arguments::new()
            .with_named("name", "web")
            .with_named("probes", Value::from(probes.clone())),
    )?;
    ensure!(probe.is_frozen());
    ensure!(probes.is_frozen());
    ensure!(probe.insert("period_seconds", 2).is_err());
    Ok(())
}

#[rstest]
fn config_map_binds_its_data(host: Host) -> Result<()> {
    host.call(
        "v1alpha1.config_map",
        &Arguments::new()
            .with_named("name", "settings")
            .with_named("annotations", dict([("owner", Value::from("ops"))]))
            .with_named("data", dict([("mode", Value::from("fast"))])),
    )?;
    let expected = ConfigMap {
        metadata: ObjectMeta {
            name: "settings".to_owned(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::from([("owner".to_owned(), "ops".to_owned())]),
        },
        data: BTreeMap::from([("mode".to_owned(), "fast".to_owned())]),
    };
    ensure!(host.only::<ConfigMap>()? == expected);
    Ok(())
}

#[rstest]
#[case::missing_name(
    "v1alpha1.config_map",
    Arguments::new(),
    "v1alpha1.config_map: missing argument for name"
)]
#[case::unknown_keyword(
    "v1alpha1.probe",
    Arguments::new().with_named("timeout", 1),
    "v1alpha1.probe: unexpected keyword argument timeout"
)]
#[case::metadata_type(
    "v1alpha1.cmd",
    Arguments::new().with_named("name", "web").with_named("labels", Value::from("x")),
    "v1alpha1.cmd: for parameter labels: expected dict, actual: string"
)]
fn argument_binding_errors(host: Host, #[case] function: &str, #[case] args: Arguments, #[case] message: &str) {
    let err = host.call(function, &args).err();
    assert_eq!(err.map(|err| err.to_string()).as_deref(), Some(message));
}

#[rstest]
fn wrappers_unpack_directly() -> Result<()> {
    let thread = Thread::new("/srv/app");
    let mut wrapper = bindings::HttpGetAction::new(&thread);
    ensure!(!wrapper.is_unpacked());
    wrapper.unpack(&dict([("path", Value::from("/healthz"))]))?;
    ensure!(wrapper.is_unpacked());
    ensure!(wrapper.value.path == "/healthz");
    ensure!(wrapper.dict().is_some_and(Dict::is_frozen));

    let mut actions = bindings::HttpGetActionList::new(&thread);
    actions.unpack(&list([dict([]), dict([("port", Value::Int(1))])]))?;
    ensure!(actions.value.len() == 2);
    ensure!(actions.value.last().map(|action| action.port) == Some(1));
    ensure!(actions.list().is_some_and(List::is_frozen));
    Ok(())
}
