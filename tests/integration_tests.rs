//! Integration tests for episode-explorer.
//!
//! These tests drive the library API end to end with in-memory payloads:
//! decode, load into state, query, and render.

use episode_explorer::config::Config;
use episode_explorer::error::{LOAD_FAILURE_MESSAGE, LoadError};
use episode_explorer::loader::parse_episodes;
use episode_explorer::query::{Bounds, FilterSet, Predicate, SortField, SortState, apply};
use episode_explorer::render::{NO_RESULTS_MESSAGE, TableView, to_html, to_plain};
use episode_explorer::state::{AppState, LoadOutcome};
use episode_explorer::types::Episode;

const PAYLOAD: &[u8] = br#"[
    {"rank": 4, "title": "Blink", "series": 3, "era": "Modern", "broadcast_date": "2007-06-09", "rating": 9.1,
     "doctor": {"actor": "David Tennant", "incarnation": "Tenth Doctor"}},
    {"rank": 1, "title": "Genesis of the Daleks", "series": 12, "era": "Classic", "broadcast_date": "08/03/1975", "rating": 8.9,
     "doctor": {"actor": "Tom Baker", "incarnation": "Fourth Doctor"}},
    {"rank": 3, "title": "The Day of the Doctor", "era": "Modern", "broadcast_date": "November 23, 2013", "rating": 9.1},
    {"rank": 2, "title": "Dalek", "series": 1, "era": "Modern", "broadcast_date": "2005-04-30", "rating": 8.5},
    {"rank": 5, "title": "An Unearthly Child", "series": 1, "era": "Classic", "broadcast_date": "23/11/1963"}
]"#;

fn loaded(filters: FilterSet, sort: SortState) -> AppState {
    let mut state = AppState::new(filters, sort);
    let token = state.begin_load();
    let outcome = state.finish_load(token, parse_episodes(PAYLOAD));
    assert_eq!(outcome, LoadOutcome::Applied);
    state
}

fn ranks(episodes: &[Episode]) -> Vec<i64> {
    episodes.iter().map(|e| e.rank).collect()
}

/// Rank ascending sort of A(1), B(3), C(2).
#[test]
fn test_rank_sort_scenario() {
    let set = vec![Episode::new(1, "A"), Episode::new(3, "B"), Episode::new(2, "C")];
    let out = apply(&set, &FilterSet::default(), &SortState::default());
    let titles: Vec<&str> = out.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "C", "B"]);
}

/// Title filter on the same set keeps only B.
#[test]
fn test_title_filter_scenario() {
    let set = vec![Episode::new(1, "A"), Episode::new(3, "B"), Episode::new(2, "C")];
    let filters = FilterSet::parse("B").unwrap();
    let out = apply(&set, &filters, &SortState::default());
    assert_eq!(ranks(&out), vec![3]);
}

/// A non-JSON response leaves the set empty, shows the error, hides loading.
#[test]
fn test_non_json_response_scenario() {
    let mut state = AppState::default();
    let token = state.begin_load();
    assert!(state.is_loading());

    let result = parse_episodes(b"<!DOCTYPE html><html>Not Found</html>");
    assert_eq!(state.finish_load(token, result), LoadOutcome::Failed);

    assert!(state.episodes().is_empty());
    assert_eq!(state.error_message(), Some(LOAD_FAILURE_MESSAGE));
    assert!(!state.is_loading());
}

/// An over-restrictive filter renders "no results", not an empty table.
#[test]
fn test_no_results_scenario() {
    let state = loaded(FilterSet::parse("series:40-").unwrap(), SortState::default());
    let view = TableView::from_episodes(state.filtered());
    assert_eq!(view, TableView::NoResults);

    assert!(to_plain(&view, &state.sort()).contains(NO_RESULTS_MESSAGE));
    let html = to_html(&view, &state.sort());
    assert!(html.contains("no-results"));
    assert!(!html.contains("<td>-</td>"));
}

/// Filtering is exact: every kept record matches, every matching record is kept.
#[test]
fn test_filter_is_exact() {
    let filter_texts = [
        "",
        "dalek",
        "era:modern",
        "series:1-3",
        "year:2000-",
        "rating:9-",
        "any:tennant",
        "the era:modern rating:-9.5",
    ];
    let source = parse_episodes(PAYLOAD).unwrap();

    for text in filter_texts {
        let filters = FilterSet::parse(text).unwrap();
        let out = apply(&source, &filters, &SortState::default());

        assert!(out.iter().all(|e| filters.matches(e)), "false positive for {:?}", text);
        let expected = source.iter().filter(|e| filters.matches(e)).count();
        assert_eq!(out.len(), expected, "false negative for {:?}", text);
        assert!(out.iter().all(|e| source.contains(e)));
    }
}

/// Sorted output is ordered on the field and stable for equal keys.
#[test]
fn test_sort_order_and_stability() {
    let source = parse_episodes(PAYLOAD).unwrap();

    for field in SortField::ALL {
        for ascending in [true, false] {
            let sort = SortState { field, ascending };
            let out = apply(&source, &FilterSet::default(), &sort);

            for pair in out.windows(2) {
                let ordering = sort.compare(&pair[0], &pair[1]);
                assert_ne!(ordering, std::cmp::Ordering::Greater, "{:?}", sort);

                if ordering == std::cmp::Ordering::Equal {
                    let pos = |e: &Episode| source.iter().position(|s| s == e);
                    assert!(pos(&pair[0]) < pos(&pair[1]), "unstable for {:?}", sort);
                }
            }
        }
    }
}

/// Equal ratings keep source order in both directions.
#[test]
fn test_rating_ties_keep_source_order() {
    let asc = loaded(
        FilterSet::new(vec![Predicate::Rating(Bounds::new(Some(9.0), None))]),
        SortState {
            field: SortField::Rating,
            ascending: true,
        },
    );
    assert_eq!(ranks(asc.filtered()), vec![4, 3]);

    let desc = loaded(
        FilterSet::new(vec![Predicate::Rating(Bounds::new(Some(9.0), None))]),
        SortState {
            field: SortField::Rating,
            ascending: false,
        },
    );
    assert_eq!(ranks(desc.filtered()), vec![4, 3]);
}

/// Broadcast sort understands the mixed date formats.
#[test]
fn test_broadcast_sort_mixed_formats() {
    let state = loaded(
        FilterSet::default(),
        SortState {
            field: SortField::Broadcast,
            ascending: true,
        },
    );
    assert_eq!(ranks(state.filtered()), vec![5, 1, 2, 4, 3]);
}

/// Running the query twice gives the same sequence.
#[test]
fn test_query_is_idempotent() {
    let source = parse_episodes(PAYLOAD).unwrap();
    let filters = FilterSet::parse("era:modern").unwrap();
    let sort = SortState {
        field: SortField::Title,
        ascending: false,
    };
    assert_eq!(apply(&source, &filters, &sort), apply(&source, &filters, &sort));
}

/// A late response from a superseded load never replaces the newer set.
#[test]
fn test_last_issued_load_wins() {
    let mut state = AppState::default();
    let first = state.begin_load();
    let second = state.begin_load();

    let outcome = state.finish_load(second, parse_episodes(PAYLOAD));
    assert_eq!(outcome, LoadOutcome::Applied);

    let late = state.finish_load(first, Err(LoadError::Network("timed out".to_string())));
    assert_eq!(late, LoadOutcome::Stale);
    assert_eq!(state.episodes().len(), 5);
    assert!(state.error_message().is_none());
}

/// Filters given on the command line survive a reload.
#[test]
fn test_reload_keeps_filters_and_sort() {
    let mut state = loaded(
        FilterSet::parse("era:classic").unwrap(),
        SortState {
            field: SortField::Rank,
            ascending: false,
        },
    );
    assert_eq!(ranks(state.filtered()), vec![5, 1]);

    let token = state.begin_load();
    state.finish_load(token, parse_episodes(PAYLOAD));
    assert_eq!(ranks(state.filtered()), vec![5, 1]);
}

/// Config defaults drive the startup sort.
#[test]
fn test_config_defaults() {
    let config = Config::new();
    assert_eq!(config.sort_state().unwrap(), SortState::default());
    assert!(config.api_url.ends_with("doctor-who-episodes.json"));
}

/// Rendered HTML carries opaque fields through to the table.
#[test]
fn test_html_render_of_loaded_set() {
    let state = loaded(FilterSet::parse("any:baker").unwrap(), SortState::default());
    let html = to_html(&TableView::from_episodes(state.filtered()), &state.sort());
    assert!(html.contains("<td>Genesis of the Daleks</td>"));
    assert!(html.contains("<td>Tom Baker</td>"));
    assert!(html.contains("<th>Rank ▲</th>"));
}
