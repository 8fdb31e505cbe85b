//! Discovery of the nested structs reachable from root specs.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::Conventions;
use crate::model::{TypeDescriptor, TypeGraph};

/// Returns every struct reachable from the roots' spec types through struct,
/// `Option<struct>` and `Vec<struct>` members, each exactly once and sorted by
/// name.
///
/// The spec types themselves are only included when some member reaches them.
/// Opaque types are neither returned nor descended into, and roots without a
/// struct spec contribute nothing.
#[must_use]
pub fn find_struct_members<'g>(
    graph: &'g TypeGraph,
    roots: &[&'g TypeDescriptor],
    conventions: &Conventions,
) -> Vec<&'g TypeDescriptor> {
    let mut found = BTreeMap::new();
    for root in roots {
        let Some(spec) = graph.spec_type(root, conventions) else {
            continue;
        };
        collect(graph, spec, conventions, &mut found);
    }
    found.into_values().collect()
}

fn collect<'g>(
    graph: &'g TypeGraph,
    owner: &'g TypeDescriptor,
    conventions: &Conventions,
    found: &mut BTreeMap<&'g str, &'g TypeDescriptor>,
) {
    for member in owner.members() {
        if conventions.is_opaque(graph, &member.ty) {
            continue;
        }
        let Some(target) = graph.struct_target(&member.ty) else {
            continue;
        };
        if found.contains_key(target.name.as_str()) {
            continue;
        }
        debug!(owner = %owner.name, member = %member.name, found = %target.name, "discovered struct");
        found.insert(target.name.as_str(), target);
        collect(graph, target, conventions, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDescriptor, ScalarKind, TypeExpr};
    use rstest::{fixture, rstest};

    const PKG: &str = "crate::v1alpha1";

    fn named(name: &str) -> TypeExpr {
        TypeExpr::named(name)
    }

    fn root(name: &str, spec: &str) -> TypeDescriptor {
        TypeDescriptor::new_struct(
            name,
            PKG,
            vec![
                FieldDescriptor::new("metadata", named("ObjectMeta")),
                FieldDescriptor::new("spec", named(spec)),
            ],
        )
    }

    #[fixture]
    fn graph() -> TypeGraph {
        let mut graph = TypeGraph::new();
        graph.insert(root("Cmd", "CmdSpec"));
        graph.insert(root("Button", "ButtonSpec"));
        graph.insert(TypeDescriptor::new_struct("ObjectMeta", "crate::metav1", Vec::new()));
        graph.insert(TypeDescriptor::new_struct("Time", "crate::metav1", Vec::new()));
        graph.insert(TypeDescriptor::new_struct(
            "CmdSpec",
            PKG,
            vec![
                FieldDescriptor::new("readiness_probe", TypeExpr::optional(named("Probe"))),
                FieldDescriptor::new("env", TypeExpr::slice(named("EnvVar"))),
                FieldDescriptor::new("started_at", TypeExpr::optional(named("Time"))),
                FieldDescriptor::new("port", TypeExpr::scalar("i32", ScalarKind::Int)),
            ],
        ));
        graph.insert(TypeDescriptor::new_struct(
            "ButtonSpec",
            PKG,
            vec![FieldDescriptor::new("probe", named("Probe"))],
        ));
        graph.insert(TypeDescriptor::new_struct(
            "Probe",
            PKG,
            vec![
                FieldDescriptor::new("handler", named("Handler")),
                FieldDescriptor::new("fallback", TypeExpr::Pointer {
                    elem: Box::new(named("Probe")),
                    boxed: true,
                }),
            ],
        ));
        graph.insert(TypeDescriptor::new_struct(
            "Handler",
            PKG,
            vec![FieldDescriptor::new("parent", TypeExpr::slice(named("Probe")))],
        ));
        graph.insert(TypeDescriptor::new_struct("EnvVar", PKG, Vec::new()));
        graph
    }

    fn names(found: &[&TypeDescriptor]) -> Vec<String> {
        found.iter().map(|t| t.name.clone()).collect()
    }

    #[rstest]
    fn finds_reachable_structs_once_in_name_order(graph: TypeGraph) {
        let roots = vec![
            graph.get("Cmd").expect("Cmd"),
            graph.get("Button").expect("Button"),
        ];
        let found = find_struct_members(&graph, &roots, &Conventions::default());
        assert_eq!(names(&found), vec!["EnvVar", "Handler", "Probe"]);
    }

    #[rstest]
    fn terminates_on_mutual_recursion(graph: TypeGraph) {
        let roots = vec![graph.get("Button").expect("Button")];
        let found = find_struct_members(&graph, &roots, &Conventions::default());
        assert_eq!(names(&found), vec!["Handler", "Probe"]);
    }

    #[rstest]
    fn skips_opaque_types(graph: TypeGraph) {
        let roots = vec![graph.get("Cmd").expect("Cmd")];
        let found = find_struct_members(&graph, &roots, &Conventions::default());
        assert!(!names(&found).contains(&"Time".to_owned()));

        let conventions = Conventions {
            opaque_types: ["Probe".to_owned()].into_iter().collect(),
            ..Conventions::default()
        };
        let found = find_struct_members(&graph, &roots, &conventions);
        assert_eq!(names(&found), vec!["EnvVar", "Time"]);
    }

    #[rstest]
    fn ignores_roots_without_a_struct_spec(mut graph: TypeGraph) {
        graph.insert(TypeDescriptor::new_struct(
            "ConfigMap",
            PKG,
            vec![FieldDescriptor::new(
                "data",
                TypeExpr::map(
                    TypeExpr::scalar("String", ScalarKind::String),
                    TypeExpr::scalar("String", ScalarKind::String),
                ),
            )],
        ));
        let roots = vec![graph.get("ConfigMap").expect("ConfigMap")];
        assert!(find_struct_members(&graph, &roots, &Conventions::default()).is_empty());
    }

    #[rstest]
    fn is_deterministic(graph: TypeGraph) {
        let forward = vec![
            graph.get("Cmd").expect("Cmd"),
            graph.get("Button").expect("Button"),
        ];
        let reversed: Vec<_> = forward.iter().rev().copied().collect();
        let conventions = Conventions::default();
        assert_eq!(
            names(&find_struct_members(&graph, &forward, &conventions)),
            names(&find_struct_members(&graph, &reversed, &conventions))
        );
    }
}
