//! Built-in scenario catalog for batch runs

/// Scenarios replayed by `synthook run --count` when no scenario is given
pub const BUILTIN_SCENARIOS: &[&str] = &[
    "Simule um webhook de Pix Cash In de R$ 120",
    "Simule um webhook de Pix Cash Out de R$ 250",
    "Simule um webhook de Pix Cash In de R$ 500 pendente",
    "Simule um webhook de Pix Cash Out de R$ 300",
    "Simule um webhook de Pix Cash In de R$ 75",
];

/// Ordered list of scenario texts drawn round-robin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioCatalog {
    scenarios: Vec<String>,
}

impl ScenarioCatalog {
    /// Create a catalog from scenario texts, dropping blank entries
    pub fn new<I, S>(scenarios: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scenarios: scenarios
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.trim().is_empty())
                .collect(),
        }
    }

    /// Catalog of Pix cash-in and cash-out scenarios
    pub fn builtin() -> Self {
        Self::new(BUILTIN_SCENARIOS.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn scenarios(&self) -> &[String] {
        &self.scenarios
    }

    /// The first `count` scenarios, wrapping around the catalog
    ///
    /// Yields nothing for an empty catalog.
    pub fn take(&self, count: usize) -> impl Iterator<Item = &str> {
        self.scenarios
            .iter()
            .map(String::as_str)
            .cycle()
            .take(if self.scenarios.is_empty() { 0 } else { count })
    }
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthook_schema::{EventType, SchemaRegistry};

    #[test]
    fn test_round_robin() {
        let catalog = ScenarioCatalog::new(["a", "b", "c"]);
        let drawn: Vec<_> = catalog.take(7).collect();
        assert_eq!(drawn, vec!["a", "b", "c", "a", "b", "c", "a"]);
    }

    #[test]
    fn test_empty_catalog_yields_nothing() {
        let catalog = ScenarioCatalog::new(["", "   "]);
        assert!(catalog.is_empty());
        assert_eq!(catalog.take(3).count(), 0);
    }

    #[test]
    fn test_builtin_scenarios_resolve_to_one_type() {
        let registry = SchemaRegistry::builtin();
        let resolved: Vec<EventType> = ScenarioCatalog::builtin()
            .scenarios()
            .iter()
            .map(|s| registry.infer(s).unwrap())
            .collect();

        assert_eq!(resolved[0], EventType::cash_in());
        assert_eq!(resolved[1], EventType::cash_out());
        assert_eq!(resolved.len(), 5);
    }
}
