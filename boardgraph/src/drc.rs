//! Design-Rule Checking
//!
//! Reads a finished board and reports shorted and unconnected pins plus a
//! few board-level sanity checks. Nothing here mutates the board.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::board::{BoardGraph, InstanceId, NetId};
use crate::connectivity::ConnectivityGraph;
use crate::core::CheckOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A single finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<InstanceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net: Option<NetId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Issue {
    pub fn new(rule_id: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity,
            message: message.into(),
            component: None,
            net: None,
            suggestion: None,
        }
    }

    pub fn with_component(mut self, component: InstanceId) -> Self {
        self.component = Some(component);
        self
    }

    pub fn with_net(mut self, net: NetId) -> Self {
        self.net = Some(net);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Everything a rule may look at
pub struct RuleContext<'a> {
    pub board: &'a BoardGraph,
    pub graph: &'a ConnectivityGraph,
}

pub trait DesignRule {
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Strict-only rules run only when `CheckOptions::strict` is set
    fn strict_only(&self) -> bool {
        false
    }

    fn check(&self, context: &RuleContext<'_>) -> Vec<Issue>;
}

/// Two or more pins of one component on the same net
pub struct ShortCircuitRule;

impl DesignRule for ShortCircuitRule {
    fn id(&self) -> &'static str {
        "short_circuit"
    }

    fn description(&self) -> &'static str {
        "Component with several pins bound to the same net"
    }

    fn check(&self, context: &RuleContext<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        for component in context.board.components() {
            let mut pins_by_net: HashMap<NetId, Vec<&str>> = HashMap::new();
            for pin in &component.pins {
                if let Some(net_id) = pin.connected_net_id {
                    pins_by_net.entry(net_id).or_default().push(pin.pin_name.as_str());
                }
            }

            let mut shorted: Vec<_> = pins_by_net.into_iter().filter(|(_, pins)| pins.len() > 1).collect();
            shorted.sort_by_key(|(net_id, _)| *net_id);
            for (net_id, pins) in shorted {
                let net_name = context.board.net(net_id).map(|n| n.name.as_str()).unwrap_or("?");
                issues.push(
                    Issue::new(
                        self.id(),
                        Severity::Error,
                        format!(
                            "Component {} ({}) is short-circuited: pins {} share net {}",
                            component.instance_id,
                            component.definition_id,
                            pins.join(", "),
                            net_name
                        ),
                    )
                    .with_component(component.instance_id)
                    .with_net(net_id)
                    .with_suggestion("Move one of the pins to a different net"),
                );
            }
        }
        issues
    }
}

/// Pins not bound to any net
pub struct UnconnectedPinRule;

impl DesignRule for UnconnectedPinRule {
    fn id(&self) -> &'static str {
        "unconnected_pin"
    }

    fn description(&self) -> &'static str {
        "Pin that is not bound to any net"
    }

    fn check(&self, context: &RuleContext<'_>) -> Vec<Issue> {
        context
            .board
            .components()
            .flat_map(|component| {
                component
                    .pins
                    .iter()
                    .filter(|p| !p.is_connected())
                    .map(move |pin| {
                        Issue::new(
                            self.id(),
                            Severity::Warning,
                            format!(
                                "Pin {} of component {} ({}) is unconnected",
                                pin.pin_name, component.instance_id, component.definition_id
                            ),
                        )
                        .with_component(component.instance_id)
                    })
            })
            .collect()
    }
}

/// Nets with a single pin connect nothing to anything
pub struct FloatingNetRule;

impl DesignRule for FloatingNetRule {
    fn id(&self) -> &'static str {
        "floating_net"
    }

    fn description(&self) -> &'static str {
        "Net with only one bound pin"
    }

    fn check(&self, context: &RuleContext<'_>) -> Vec<Issue> {
        context
            .board
            .nets()
            .filter(|net| net.pin_count() == 1)
            .map(|net| {
                Issue::new(
                    self.id(),
                    Severity::Warning,
                    format!("Net {} has only one connected pin", net.name),
                )
                .with_net(net.net_id)
            })
            .collect()
    }
}

/// A populated board needs a ground reference
pub struct MissingGroundRule;

impl DesignRule for MissingGroundRule {
    fn id(&self) -> &'static str {
        "missing_ground"
    }

    fn description(&self) -> &'static str {
        "Board has components but no GND/0 net"
    }

    fn check(&self, context: &RuleContext<'_>) -> Vec<Issue> {
        if context.board.component_count() == 0 || context.board.nets().any(|n| n.is_ground()) {
            return Vec::new();
        }
        vec![Issue::new(self.id(), Severity::Error, "No ground net on the board")
            .with_suggestion("Create a net named GND and connect the source return to it")]
    }
}

/// More than one electrically separate group
pub struct IsolatedIslandRule;

impl DesignRule for IsolatedIslandRule {
    fn id(&self) -> &'static str {
        "isolated_island"
    }

    fn description(&self) -> &'static str {
        "Board splits into several unconnected groups"
    }

    fn strict_only(&self) -> bool {
        true
    }

    fn check(&self, context: &RuleContext<'_>) -> Vec<Issue> {
        let islands = context.graph.island_count();
        if islands <= 1 {
            return Vec::new();
        }
        vec![Issue::new(
            self.id(),
            Severity::Info,
            format!("Board splits into {} unconnected groups", islands),
        )]
    }
}

pub struct DesignRuleChecker {
    rules: Vec<Box<dyn DesignRule>>,
}

impl DesignRuleChecker {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_default_rules() -> Self {
        let mut checker = Self::new();
        checker.add_rule(Box::new(ShortCircuitRule));
        checker.add_rule(Box::new(UnconnectedPinRule));
        checker.add_rule(Box::new(FloatingNetRule));
        checker.add_rule(Box::new(MissingGroundRule));
        checker.add_rule(Box::new(IsolatedIslandRule));
        checker
    }

    pub fn add_rule(&mut self, rule: Box<dyn DesignRule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn DesignRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Run every enabled rule; issues come back ordered by severity
    pub fn check(&self, board: &BoardGraph, options: &CheckOptions) -> Vec<Issue> {
        let graph = ConnectivityGraph::from_board(board);
        let context = RuleContext {
            board,
            graph: &graph,
        };

        let mut issues: Vec<Issue> = self
            .rules
            .iter()
            .filter(|rule| options.strict || !rule.strict_only())
            .filter(|rule| options.rules.is_empty() || options.rules.iter().any(|r| r == rule.id()))
            .flat_map(|rule| rule.check(&context))
            .collect();
        issues.sort_by_key(|i| i.severity);

        tracing::debug!(issues = issues.len(), "design-rule check finished");
        issues
    }
}

impl Default for DesignRuleChecker {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ComponentCatalog;
    use crate::grid::GridPosition;

    fn board_with_resistor() -> (BoardGraph, InstanceId) {
        let catalog = ComponentCatalog::builtin();
        let mut board = BoardGraph::default();
        let id = board
            .place_definition(catalog.get("resistor").unwrap(), GridPosition::ORIGIN, 0, None, false)
            .unwrap()
            .instance_id;
        (board, id)
    }

    fn bind(board: &mut BoardGraph, component: InstanceId, pin: usize, net: NetId) {
        let pin = board.pin_ref(component, pin).unwrap();
        board.connect_pin_to_net(net, &pin).unwrap();
    }

    fn rule_ids(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.rule_id.as_str()).collect()
    }

    #[test]
    fn test_short_circuit_detected() {
        let (mut board, r) = board_with_resistor();
        let gnd = board.create_net("GND").net_id;
        bind(&mut board, r, 0, gnd);
        bind(&mut board, r, 1, gnd);

        let issues = DesignRuleChecker::with_default_rules().check(&board, &CheckOptions::default());
        assert_eq!(rule_ids(&issues), vec!["short_circuit"]);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].component, Some(r));
        assert!(issues[0].message.contains("1, 2"));
    }

    #[test]
    fn test_unconnected_and_missing_ground() {
        let (board, r) = board_with_resistor();
        let issues = DesignRuleChecker::with_default_rules().check(&board, &CheckOptions::default());

        assert_eq!(issues[0].rule_id, "missing_ground");
        let unconnected: Vec<_> = issues.iter().filter(|i| i.rule_id == "unconnected_pin").collect();
        assert_eq!(unconnected.len(), 2);
        assert!(unconnected.iter().all(|i| i.component == Some(r)));
    }

    #[test]
    fn test_floating_net() {
        let (mut board, r) = board_with_resistor();
        let gnd = board.create_net("GND").net_id;
        let sig = board.create_net("SIG").net_id;
        bind(&mut board, r, 0, gnd);
        bind(&mut board, r, 1, sig);

        let issues = DesignRuleChecker::with_default_rules().check(&board, &CheckOptions::default());
        let floating: Vec<_> = issues.iter().filter(|i| i.rule_id == "floating_net").collect();
        assert_eq!(floating.len(), 2);
    }

    #[test]
    fn test_rule_filter_and_strict_rules() {
        let (board, _) = board_with_resistor();
        let only_ground = CheckOptions {
            strict: false,
            rules: vec!["missing_ground".to_string()],
        };
        let issues = DesignRuleChecker::with_default_rules().check(&board, &only_ground);
        assert_eq!(rule_ids(&issues), vec!["missing_ground"]);

        let mut board = board;
        let catalog = ComponentCatalog::builtin();
        board
            .place_definition(catalog.get("capacitor").unwrap(), GridPosition::new(5, 5), 0, None, false)
            .unwrap();
        let relaxed = DesignRuleChecker::with_default_rules().check(&board, &CheckOptions::default());
        assert!(!rule_ids(&relaxed).contains(&"isolated_island"));

        let strict = CheckOptions {
            strict: true,
            rules: vec![],
        };
        let issues = DesignRuleChecker::with_default_rules().check(&board, &strict);
        assert!(rule_ids(&issues).contains(&"isolated_island"));
    }

    #[test]
    fn test_empty_board_is_clean() {
        let board = BoardGraph::default();
        let strict = CheckOptions {
            strict: true,
            rules: vec![],
        };
        assert!(DesignRuleChecker::default().check(&board, &strict).is_empty());
    }
}
