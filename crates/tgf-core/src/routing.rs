//! Routing table: source endpoint -> set of destination endpoints.
//!
//! Built once at startup from either the `FORWARDING_RULES` string or the
//! legacy `SOURCE_ID`/`TARGET_ID` pair, and immutable afterwards. Rule grammar:
//! comma separates rule groups, colon separates integers within a group where
//! the first is the source and the rest are destinations. `A:B:C,D:E` means
//! A -> {B, C}, D -> {E}. Repeated sources union their destinations.

use std::collections::{BTreeSet, HashMap};

use crate::{
    domain::ChatId,
    errors::Error,
    Result,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutingTable {
    map: HashMap<ChatId, BTreeSet<ChatId>>,
}

impl RoutingTable {
    /// Build the table from whichever configuration form is present.
    ///
    /// Exactly one of {rule string, legacy pair} must be configured; both or
    /// neither is a fatal config error so the process never starts with a
    /// partially-configured router.
    pub fn from_config(rules: Option<&str>, legacy: Option<(i64, i64)>) -> Result<Self> {
        match (rules, legacy) {
            (Some(_), Some(_)) => Err(Error::Config(
                "both FORWARDING_RULES and SOURCE_ID/TARGET_ID are set; configure exactly one"
                    .to_string(),
            )),
            (None, None) => Err(Error::Config(
                "no forwarding rules configured; set either FORWARDING_RULES or SOURCE_ID/TARGET_ID"
                    .to_string(),
            )),
            (Some(rules), None) => Self::parse_rules(rules),
            (None, Some((source, target))) => Ok(Self::single(ChatId(source), ChatId(target))),
        }
    }

    /// Single legacy rule: one source, one destination.
    pub fn single(source: ChatId, target: ChatId) -> Self {
        let mut map = HashMap::new();
        map.insert(source, BTreeSet::from([target]));
        Self { map }
    }

    /// Parse a rule string. Malformed input fails with an error naming the
    /// offending group; nothing is silently defaulted. Identifiers must be
    /// plain integers; anything else (usernames, t.me links, stray delimiter
    /// characters) is rejected rather than guessed at.
    pub fn parse_rules(rules: &str) -> Result<Self> {
        let mut map: HashMap<ChatId, BTreeSet<ChatId>> = HashMap::new();

        for group in rules.split(',') {
            let group = group.trim();
            if group.is_empty() {
                continue;
            }

            let ids = group
                .split(':')
                .map(|tok| parse_endpoint_id(tok, group))
                .collect::<Result<Vec<ChatId>>>()?;

            if ids.len() < 2 {
                return Err(Error::Config(format!(
                    "invalid forwarding rule {group:?}: expected source:destination[:destination...]"
                )));
            }

            map.entry(ids[0]).or_default().extend(&ids[1..]);
        }

        if map.is_empty() {
            return Err(Error::Config(
                "FORWARDING_RULES is set but contains no rules".to_string(),
            ));
        }

        Ok(Self { map })
    }

    pub fn destinations(&self, source: ChatId) -> Option<&BTreeSet<ChatId>> {
        self.map.get(&source)
    }

    pub fn rules(&self) -> impl Iterator<Item = (ChatId, &BTreeSet<ChatId>)> {
        self.map.iter().map(|(s, d)| (*s, d))
    }

    pub fn sources(&self) -> impl Iterator<Item = ChatId> + '_ {
        self.map.keys().copied()
    }

    /// Every unique endpoint id in the table, sources and destinations alike.
    /// Used by the startup sanity check that resolves ids to live chats.
    pub fn endpoints(&self) -> BTreeSet<ChatId> {
        let mut out: BTreeSet<ChatId> = self.map.keys().copied().collect();
        for dests in self.map.values() {
            out.extend(dests);
        }
        out
    }

    pub fn rule_count(&self) -> usize {
        self.map.len()
    }

    pub fn destination_count(&self) -> usize {
        self.map
            .values()
            .flatten()
            .copied()
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn parse_endpoint_id(token: &str, group: &str) -> Result<ChatId> {
    token
        .trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| {
            Error::Config(format!(
                "invalid endpoint id {token:?} in forwarding rule {group:?}: expected an integer chat id"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dests(table: &RoutingTable, source: i64) -> Vec<i64> {
        table
            .destinations(ChatId(source))
            .map(|d| d.iter().map(|c| c.0).collect())
            .unwrap_or_default()
    }

    #[test]
    fn parses_multi_destination_groups() {
        let t = RoutingTable::parse_rules("-100111:-100222:-100333,-100444:-100222").unwrap();
        assert_eq!(t.rule_count(), 2);
        assert_eq!(dests(&t, -100111), vec![-100333, -100222]);
        assert_eq!(dests(&t, -100444), vec![-100222]);
    }

    #[test]
    fn repeated_sources_union_destinations() {
        let t = RoutingTable::parse_rules("1:2:3,1:4").unwrap();
        assert_eq!(t.rule_count(), 1);
        assert_eq!(dests(&t, 1), vec![2, 3, 4]);
    }

    #[test]
    fn duplicate_destinations_collapse() {
        let t = RoutingTable::parse_rules("1:2:2,1:2").unwrap();
        assert_eq!(dests(&t, 1), vec![2]);
    }

    #[test]
    fn tolerates_whitespace_and_stray_commas() {
        let t = RoutingTable::parse_rules(" 1 : 2 ,, 3:4 ,").unwrap();
        assert_eq!(t.rule_count(), 2);
        assert_eq!(dests(&t, 1), vec![2]);
        assert_eq!(dests(&t, 3), vec![4]);
    }

    #[test]
    fn rejects_non_integer_token() {
        let err = RoutingTable::parse_rules("1:@mychannel").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("@mychannel"), "got: {msg}");
        assert!(msg.contains("1:@mychannel"), "got: {msg}");
    }

    #[test]
    fn rejects_group_without_destination() {
        let err = RoutingTable::parse_rules("1:2,3").unwrap_err();
        assert!(err.to_string().contains("\"3\""), "got: {err}");
    }

    #[test]
    fn rejects_empty_rule_string() {
        assert!(RoutingTable::parse_rules(" , ,").is_err());
    }

    #[test]
    fn legacy_pair_builds_single_rule() {
        let t = RoutingTable::from_config(None, Some((-100, 200))).unwrap();
        assert_eq!(t.rule_count(), 1);
        assert_eq!(dests(&t, -100), vec![200]);
    }

    #[test]
    fn both_forms_configured_is_an_error() {
        let err = RoutingTable::from_config(Some("1:2"), Some((1, 2))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn neither_form_configured_is_an_error() {
        let err = RoutingTable::from_config(None, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn endpoints_cover_sources_and_destinations() {
        let t = RoutingTable::parse_rules("1:2:3,4:2").unwrap();
        let ids: Vec<i64> = t.endpoints().into_iter().map(|c| c.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(t.destination_count(), 2);
    }
}
