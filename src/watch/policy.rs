// src/watch/policy.rs

//! Message emission rules for one watch tick.
//!
//! Each destination channel maps to the server whose name equals the
//! channel's uppercased name. Messages for a channel are decided in a
//! fixed order: routine report, surge alert, blacklist-entry alert,
//! blacklist-clear notice. A channel with no matching server gets a
//! single fetch-error line instead.

use std::collections::HashSet;

use crate::gateway::OutboundMessage;
use crate::models::Snapshot;
use crate::watch::diff::population_delta;

/// Decide the outbound messages for one channel, in emission order.
///
/// `alerted` carries the servers whose blacklist-entry alert has already
/// fired; it is mutated on the enter and clear transitions, and only then.
pub fn evaluate_channel(
    channel: &str,
    stamp: &str,
    current: &Snapshot,
    previous: Option<&Snapshot>,
    surge_threshold: i64,
    alerted: &mut HashSet<String>,
) -> Vec<OutboundMessage> {
    let server = channel.to_uppercase();
    let Some(status) = current.get(&server) else {
        return vec![OutboundMessage::plain(
            channel,
            format!("{stamp} {server} data fetch error."),
        )];
    };

    let mut messages = Vec::new();

    messages.push(OutboundMessage::plain(
        channel,
        format!(
            "{stamp} {server} count:{} blacklistTargets:[{}]",
            status.population,
            status.blacklist_matches.join(", ")
        ),
    ));

    let delta = population_delta(previous, current, &server);
    if delta >= surge_threshold {
        messages.push(OutboundMessage::attention(
            channel,
            format!("Population surge. threshold:{surge_threshold} delta:{delta}"),
        ));
    }

    if !status.blacklist_matches.is_empty() && !alerted.contains(&server) {
        messages.push(OutboundMessage::attention(
            channel,
            format!(
                "Blacklist target entered. targets:[{}]",
                status.blacklist_matches.join(", ")
            ),
        ));
        alerted.insert(server.clone());
    }

    if status.blacklist_matches.is_empty() && alerted.contains(&server) {
        messages.push(OutboundMessage::plain(
            channel,
            "Blacklist targets are gone.",
        ));
        alerted.remove(&server);
    }

    messages
}
