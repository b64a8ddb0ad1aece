//! Cross-source event aggregation.
//!
//! The [`EventAggregator`] owns every registered [`EventSource`] together
//! with the last batch it delivered, and the canonical list shown on the
//! board. Each poll fetches all ready sources concurrently, then replays
//! every staged batch in registration order so the result does not depend
//! on which fetch finished first.

use chrono::{Local, NaiveDateTime};
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use infoboard_core::{Event, similar};
use infoboard_providers::{CooldownState, EventSource};

use crate::highlight::HighlightRule;

/// Handle to a registered source; also its index for source highlight rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(usize);

impl SourceId {
    pub fn index(&self) -> usize {
        self.0
    }
}

struct SourceSlot {
    source: Box<dyn EventSource>,
    staged: Vec<Event>,
}

/// Status of one registered source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatus {
    pub name: String,
    pub state: CooldownState,
    pub staged: usize,
}

/// Merges the batches of all sources into one ordered list.
#[derive(Default)]
pub struct EventAggregator {
    sources: Vec<SourceSlot>,
    rules: Vec<HighlightRule>,
    events: Vec<Event>,
}

impl EventAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source. Registration order is merge order.
    pub fn add_source(&mut self, source: Box<dyn EventSource>) -> SourceId {
        let id = SourceId(self.sources.len());
        info!(source = source.name(), index = id.0, "registered event source");
        self.sources.push(SourceSlot {
            source,
            staged: Vec::new(),
        });
        id
    }

    pub fn add_rule(&mut self, rule: HighlightRule) {
        self.rules.push(rule);
    }

    /// The canonical list, ordered by start.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn status(&self) -> Vec<SourceStatus> {
        self.sources
            .iter()
            .map(|slot| SourceStatus {
                name: slot.source.name().to_string(),
                state: slot.source.state(),
                staged: slot.staged.len(),
            })
            .collect()
    }

    /// Polls every ready source and rebuilds or prunes the list.
    ///
    /// Returns true if at least one source delivered a new batch.
    pub async fn poll(&mut self) -> bool {
        self.poll_at(Local::now().naive_local()).await
    }

    /// Same as [`poll`](Self::poll) with an explicit wall-clock time for pruning.
    pub async fn poll_at(&mut self, now: NaiveDateTime) -> bool {
        let updates = self
            .sources
            .iter_mut()
            .filter(|slot| slot.source.ready())
            .map(|slot| async move {
                match slot.source.update().await {
                    Ok(batch) => {
                        debug!(source = slot.source.name(), count = batch.len(), "staged batch");
                        slot.staged = batch;
                        true
                    }
                    Err(e) => {
                        warn!(source = slot.source.name(), error = %e, "update failed");
                        slot.source.lower_cooldown();
                        false
                    }
                }
            });

        let any_new = join_all(updates).await.into_iter().any(|ok| ok);

        if any_new {
            self.rebuild();
        } else {
            self.prune(now);
        }
        any_new
    }

    /// Replays every staged batch into an empty canonical list.
    fn rebuild(&mut self) {
        self.events.clear();

        for (index, slot) in self.sources.iter_mut().enumerate() {
            if self.rules.iter().any(|r| r.targets_source(index)) {
                for event in &mut slot.staged {
                    event.set_highlighted(true);
                }
            }
            merge_into(&mut self.events, &slot.staged, &self.rules);
        }

        debug!(count = self.events.len(), "rebuilt event list");
    }

    /// Drops every event that ended before `now`. Returns how many went.
    pub fn prune(&mut self, now: NaiveDateTime) -> usize {
        let before = self.events.len();
        self.events.retain(|e| !e.interval().has_ended(now));
        let removed = before - self.events.len();
        if removed > 0 {
            debug!(removed, "pruned expired events");
        }
        removed
    }
}

/// Merges `batch` into the start-ordered `canonical` list.
///
/// An incoming event is absorbed by the first entry that has a similar name
/// and an intersecting interval, unless an entry starting later comes first;
/// in that case the event is inserted before it. Pattern rules run only for
/// inserted events.
pub fn merge_into(canonical: &mut Vec<Event>, batch: &[Event], rules: &[HighlightRule]) {
    for incoming in batch {
        let position = canonical
            .iter()
            .position(|c| is_duplicate(c, incoming) || c.start() > incoming.start());

        match position {
            Some(i) if is_duplicate(&canonical[i], incoming) => {
                combine(&mut canonical[i], incoming);
            }
            _ => {
                let mut event = incoming.clone();
                if rules.iter().any(|r| r.matches(&event)) {
                    event.set_highlighted(true);
                }
                match position {
                    Some(i) => canonical.insert(i, event),
                    None => canonical.push(event),
                }
            }
        }
    }
}

fn is_duplicate(existing: &Event, incoming: &Event) -> bool {
    similar(existing.name(), incoming.name()) && existing.interval().intersects(incoming.interval())
}

/// Folds `incoming` into `existing`.
///
/// Entries before `existing` all start no later than `incoming`, so taking
/// the earlier start keeps the list ordered.
fn combine(existing: &mut Event, incoming: &Event) {
    if incoming.name().chars().count() > existing.name().chars().count() {
        existing.set_name(incoming.name());
    }

    let existing_len = existing.location().map_or(0, |l| l.chars().count());
    if let Some(location) = incoming.location()
        && location.chars().count() > existing_len
    {
        existing.set_location(Some(location.to_string()));
    }

    if incoming.is_highlighted() {
        existing.set_highlighted(true);
    }

    existing.set_interval(existing.interval().span(incoming.interval()));
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;
    use infoboard_providers::{BoxFuture, ProviderError, ProviderResult};

    use super::*;
    use crate::highlight::SearchFields;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn ev(name: &str, start: (u32, u32), end: (u32, u32)) -> Event {
        Event::new(name, at(start.0, start.1), at(end.0, end.1)).unwrap()
    }

    fn names(events: &[Event]) -> Vec<&str> {
        events.iter().map(Event::name).collect()
    }

    /// Replays scripted results; always ready unless told otherwise.
    struct ScriptedSource {
        name: String,
        results: VecDeque<ProviderResult<Vec<Event>>>,
        ready: bool,
        lowered: Arc<Mutex<u32>>,
    }

    impl ScriptedSource {
        fn new(name: &str, results: Vec<ProviderResult<Vec<Event>>>) -> Self {
            Self {
                name: name.to_string(),
                results: results.into(),
                ready: true,
                lowered: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl EventSource for ScriptedSource {
        fn name(&self) -> &str {
            &self.name
        }

        fn ready(&self) -> bool {
            self.ready
        }

        fn update(&mut self) -> BoxFuture<'_, ProviderResult<Vec<Event>>> {
            let result = self
                .results
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::network("script exhausted")));
            Box::pin(async move { result })
        }

        fn lower_cooldown(&mut self) {
            *self.lowered.lock().unwrap() += 1;
        }

        fn state(&self) -> CooldownState {
            if *self.lowered.lock().unwrap() > 0 {
                CooldownState::Backoff
            } else {
                CooldownState::Normal
            }
        }
    }

    #[test]
    fn merge_keeps_start_order() {
        let mut list = Vec::new();
        merge_into(
            &mut list,
            &[ev("Databases", (12, 0), (14, 0)), ev("Physics", (8, 0), (10, 0))],
            &[],
        );
        merge_into(&mut list, &[ev("Algorithms", (10, 0), (11, 0))], &[]);

        assert_eq!(names(&list), ["Physics", "Algorithms", "Databases"]);
    }

    #[test]
    fn merge_is_idempotent() {
        let batch = [
            ev("Physics", (8, 0), (10, 0)),
            ev("Algorithms Lecture", (10, 15), (12, 0)),
            ev("Databases", (12, 0), (14, 0)),
        ];
        let mut list = Vec::new();
        merge_into(&mut list, &batch, &[]);
        let once = list.clone();

        merge_into(&mut list, &batch, &[]);
        assert_eq!(list, once);
    }

    #[test]
    fn merge_combines_similar_overlapping() {
        let mut list = vec![
            ev("Algorithms Lecture", (10, 15), (12, 0))
                .with_location("TB109")
                .with_id("pop-1"),
        ];
        let incoming = ev("Algorithms Lecture (room 204)", (10, 0), (11, 30))
            .with_location("TB1")
            .with_highlighted(true);

        merge_into(&mut list, &[incoming], &[]);

        assert_eq!(list.len(), 1);
        let merged = &list[0];
        assert_eq!(merged.name(), "Algorithms Lecture (room 204)");
        assert_eq!(merged.location(), Some("TB109"));
        assert_eq!(merged.id(), Some("pop-1"));
        assert!(merged.is_highlighted());
        assert_eq!(merged.start(), at(10, 0));
        assert_eq!(merged.end(), at(12, 0));
    }

    #[test]
    fn similar_but_disjoint_stays_separate() {
        let mut list = vec![ev("Algorithms Lecture", (8, 0), (10, 0))];
        merge_into(&mut list, &[ev("Algorithms Lecture", (14, 0), (16, 0))], &[]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn later_start_wins_over_similar_match_further_on() {
        // the earlier, unrelated entry is found first
        let mut list = vec![
            ev("Physics", (10, 30), (11, 0)),
            ev("Algorithms", (10, 45), (12, 0)),
        ];
        merge_into(&mut list, &[ev("Algorithms", (10, 0), (11, 0))], &[]);
        assert_eq!(names(&list), ["Algorithms", "Physics", "Algorithms"]);
    }

    #[test]
    fn pattern_rules_only_for_inserted_events() {
        let rules = [HighlightRule::pattern("exam", SearchFields::NAME).unwrap()];
        let mut list = vec![ev("Algorithms", (10, 0), (12, 0))];

        merge_into(
            &mut list,
            &[
                ev("Algorithms exam", (10, 0), (12, 0)),
                ev("Physics exam", (14, 0), (16, 0)),
            ],
            &rules,
        );

        assert_eq!(list.len(), 2);
        // absorbed: name grew but no pattern evaluation
        assert_eq!(list[0].name(), "Algorithms exam");
        assert!(!list[0].is_highlighted());
        assert!(list[1].is_highlighted());
    }

    #[tokio::test]
    async fn poll_merges_sources_in_registration_order() {
        let mut agg = EventAggregator::new();
        agg.add_source(Box::new(ScriptedSource::new(
            "pop",
            vec![Ok(vec![ev("Algorithms Lecture", (10, 15), (12, 0)).with_location("TB109")])],
        )));
        agg.add_source(Box::new(ScriptedSource::new(
            "google",
            vec![Ok(vec![
                ev("Algorithms Lecture (room 204)", (10, 0), (12, 0)),
                ev("Lunch", (12, 0), (13, 0)),
            ])],
        )));
        agg.add_rule(HighlightRule::source(1));

        assert!(agg.poll_at(at(9, 0)).await);

        let events = agg.events();
        assert_eq!(names(events), ["Algorithms Lecture (room 204)", "Lunch"]);
        assert!(events.iter().all(Event::is_highlighted));
        assert_eq!(events[0].location(), Some("TB109"));
    }

    #[tokio::test]
    async fn failed_source_keeps_previous_batch() {
        let source = ScriptedSource::new(
            "pop",
            vec![
                Ok(vec![ev("Physics", (8, 0), (10, 0))]),
                Err(ProviderError::network("down")),
            ],
        );
        let lowered = source.lowered.clone();
        let other = ScriptedSource::new(
            "google",
            vec![
                Ok(vec![ev("Lunch", (12, 0), (13, 0))]),
                Ok(vec![ev("Lunch", (12, 0), (13, 0)), ev("Sauna", (18, 0), (19, 0))]),
            ],
        );

        let mut agg = EventAggregator::new();
        agg.add_source(Box::new(source));
        agg.add_source(Box::new(other));

        assert!(agg.poll_at(at(7, 0)).await);
        assert!(agg.poll_at(at(7, 0)).await);

        assert_eq!(*lowered.lock().unwrap(), 1);
        assert_eq!(names(agg.events()), ["Physics", "Lunch", "Sauna"]);
        assert_eq!(agg.status()[0].state, CooldownState::Backoff);
        assert_eq!(agg.status()[0].staged, 1);
    }

    #[tokio::test]
    async fn no_new_data_prunes_expired() {
        let source = ScriptedSource::new(
            "pop",
            vec![Ok(vec![
                ev("Physics", (8, 0), (10, 0)),
                ev("Algorithms", (10, 0), (12, 0)),
            ])],
        );

        let mut agg = EventAggregator::new();
        agg.add_source(Box::new(source));
        assert!(agg.poll_at(at(7, 0)).await);

        // the script is exhausted now, so the next polls fail
        assert!(!agg.poll_at(at(9, 0)).await);
        assert_eq!(agg.events().len(), 2);

        // end == now is not expired yet
        assert!(!agg.poll_at(at(10, 0)).await);
        assert_eq!(agg.events().len(), 2);

        assert!(!agg.poll_at(at(10, 1)).await);
        assert_eq!(names(agg.events()), ["Algorithms"]);
    }

    #[tokio::test]
    async fn unready_sources_are_skipped() {
        let mut source = ScriptedSource::new("pop", vec![Ok(vec![ev("Physics", (8, 0), (10, 0))])]);
        source.ready = false;

        let mut agg = EventAggregator::new();
        let id = agg.add_source(Box::new(source));
        assert_eq!(id.index(), 0);

        assert!(!agg.poll_at(at(7, 0)).await);
        assert!(agg.events().is_empty());
        assert_eq!(agg.status()[0].state, CooldownState::Normal);
    }

    #[test]
    fn prune_leaves_untouched_list_alone() {
        let mut agg = EventAggregator::new();
        agg.events = vec![ev("Physics", (8, 0), (10, 0))];
        assert_eq!(agg.prune(at(9, 0)), 0);
        assert_eq!(agg.events().len(), 1);
    }
}
