//! Logic-key dependency ordering.
//!
//! A logic key depends on every other logic key whose name is the root of a
//! variable path in its expression (`total` in `total.amount > 5`). Keys are
//! ordered with a Kahn sweep; keys the sweep never reaches (members of a
//! cycle, or downstream of one) are appended in name order and also reported
//! in `cyclic_keys`.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::parser::parse_expression;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicOrder {
    /// Every logic key exactly once; acyclic keys come after their dependencies.
    pub sorted: Vec<String>,
    /// Diagnostic subset of `sorted` that could not be ordered.
    pub cyclic_keys: Vec<String>,
}

impl LogicOrder {
    pub fn is_acyclic(&self) -> bool {
        self.cyclic_keys.is_empty()
    }

    pub fn is_cyclic(&self, key: &str) -> bool {
        self.cyclic_keys.iter().any(|k| k == key)
    }
}

/// Logic-key dependencies of every key. Keys whose expression does not parse
/// have no dependencies.
pub fn logic_dependencies(logic: &BTreeMap<String, String>) -> BTreeMap<String, BTreeSet<String>> {
    logic
        .iter()
        .map(|(key, expr)| {
            let deps = parse_expression(expr)
                .variables
                .iter()
                .filter_map(|var| var.split('.').next())
                .filter(|root| logic.contains_key(*root))
                .map(str::to_owned)
                .collect();
            (key.clone(), deps)
        })
        .collect()
}

pub fn resolve_logic_order(logic: &BTreeMap<String, String>) -> LogicOrder {
    let deps = logic_dependencies(logic);

    // Reverse index: dependency -> keys waiting on it
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut unresolved: BTreeMap<&str, usize> = BTreeMap::new();
    for (key, key_deps) in &deps {
        unresolved.insert(key.as_str(), key_deps.len());
        for dep in key_deps {
            dependents.entry(dep.as_str()).or_default().push(key.as_str());
        }
    }

    let mut queue: VecDeque<&str> = unresolved
        .iter()
        .filter(|&(_, &n)| n == 0)
        .map(|(&k, _)| k)
        .collect();
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut sorted = Vec::with_capacity(logic.len());

    while let Some(key) = queue.pop_front() {
        if !visited.insert(key) {
            continue;
        }
        sorted.push(key.to_owned());
        for &dependent in dependents.get(key).map(Vec::as_slice).unwrap_or_default() {
            if let Some(n) = unresolved.get_mut(dependent) {
                *n = n.saturating_sub(1);
                if *n == 0 && !visited.contains(dependent) {
                    queue.push_back(dependent);
                }
            }
        }
    }

    let mut cyclic_keys = Vec::new();
    for key in logic.keys() {
        if !visited.contains(key.as_str()) {
            sorted.push(key.clone());
            cyclic_keys.push(key.clone());
        }
    }

    LogicOrder {
        sorted,
        cyclic_keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logic(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn index_of(order: &LogicOrder, key: &str) -> usize {
        order.sorted.iter().position(|k| k == key).unwrap()
    }

    fn assert_each_key_once(order: &LogicOrder, logic: &BTreeMap<String, String>) {
        assert_eq!(order.sorted.len(), logic.len());
        for key in logic.keys() {
            assert_eq!(order.sorted.iter().filter(|k| *k == key).count(), 1, "{}", key);
        }
        for key in &order.cyclic_keys {
            assert!(order.sorted.contains(key));
        }
    }

    #[test]
    fn dependency_comes_first() {
        let l = logic(&[("a", "b + 1"), ("b", "1")]);
        let order = resolve_logic_order(&l);
        assert_eq!(order.sorted, vec!["b", "a"]);
        assert!(order.is_acyclic());
    }

    #[test]
    fn chain_and_diamond() {
        let l = logic(&[
            ("top", "left and right"),
            ("left", "base > 1"),
            ("right", "base < 10"),
            ("base", "fields.n.value * 2"),
        ]);
        let order = resolve_logic_order(&l);
        assert_each_key_once(&order, &l);
        assert!(index_of(&order, "base") < index_of(&order, "left"));
        assert!(index_of(&order, "base") < index_of(&order, "right"));
        assert!(index_of(&order, "left") < index_of(&order, "top"));
        assert!(index_of(&order, "right") < index_of(&order, "top"));
    }

    #[test]
    fn field_paths_are_not_dependencies() {
        let l = logic(&[("isAdult", "fields.age.value >= 18")]);
        let deps = logic_dependencies(&l);
        assert!(deps["isAdult"].is_empty());
    }

    #[test]
    fn member_path_on_logic_key_is_a_dependency() {
        let l = logic(&[("total", "[1, 2]"), ("n", "total.length")]);
        let deps = logic_dependencies(&l);
        assert!(deps["n"].contains("total"));
    }

    #[test]
    fn self_reference_is_cyclic() {
        let l = logic(&[("x", "x + 1")]);
        let order = resolve_logic_order(&l);
        assert_eq!(order.sorted, vec!["x"]);
        assert_eq!(order.cyclic_keys, vec!["x"]);
        assert!(order.is_cyclic("x"));
    }

    #[test]
    fn mutual_cycle_and_downstream_keys_reported() {
        let l = logic(&[
            ("a", "b"),
            ("b", "a"),
            ("c", "a or true"),
            ("free", "1 + 1"),
        ]);
        let order = resolve_logic_order(&l);
        assert_each_key_once(&order, &l);
        assert_eq!(order.sorted[0], "free");
        assert_eq!(order.cyclic_keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn unparsable_expression_has_no_dependencies() {
        let l = logic(&[("bad", "a +"), ("a", "1")]);
        let order = resolve_logic_order(&l);
        assert_each_key_once(&order, &l);
        assert!(order.is_acyclic());
    }

    #[test]
    fn empty_section() {
        let order = resolve_logic_order(&BTreeMap::new());
        assert!(order.sorted.is_empty());
        assert!(order.cyclic_keys.is_empty());
    }

    #[test]
    fn serializes_camel_case() {
        let order = resolve_logic_order(&logic(&[("x", "x")]));
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["cyclicKeys"], serde_json::json!(["x"]));
    }
}
