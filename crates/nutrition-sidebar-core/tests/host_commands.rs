//! Inbound host commands and collapse-state properties.

use nutrition_sidebar_core::catalog::{
    AGE_GROUP_FILTER, MENU_ENTRIES, NUTRIENT_FILTER, PROVINCE_FILTER, YEAR_FILTER,
};
use nutrition_sidebar_core::testing::{ManualScheduler, MemoryDocument, RecordingBridge};
use nutrition_sidebar_core::{
    FilterPatch, FilterSelection, HostCommand, Indicator, MemoryStorage, Sidebar, SidebarConfig,
    SidebarError,
};
use proptest::prelude::*;
use serde_json::json;

fn mounted(storage: MemoryStorage) -> (Sidebar<MemoryDocument>, RecordingBridge) {
    let bridge = RecordingBridge::new();
    let mut sidebar = Sidebar::new(
        MemoryDocument::new(1440.0),
        Box::new(storage),
        Box::new(bridge.clone()),
        Box::new(ManualScheduler::new()),
        SidebarConfig::default(),
    );
    sidebar.setup().unwrap();
    (sidebar, bridge)
}

#[test]
fn set_active_tab_command_behaves_like_a_click() {
    let (mut sidebar, bridge) = mounted(MemoryStorage::new());
    let cmd = HostCommand::parse("setActiveTab", json!({ "tabName": "regional" })).unwrap();
    sidebar.handle_command(&cmd);

    assert_eq!(sidebar.active_tab().as_deref(), Some("regional"));
    assert_eq!(bridge.sent_to("sidebar_tab_change"), vec![json!("regional")]);
    assert_eq!(
        sidebar.document().event_names(),
        vec!["sidebar:menu-item-selected"]
    );
}

#[test]
fn update_filters_command_applies_patch() {
    let (mut sidebar, _) = mounted(MemoryStorage::new());
    let cmd = HostCommand::parse(
        "updateSidebarFilters",
        json!({ "province": "Northern", "ageGroup": "6-23 months", "unknownKey": 1 }),
    )
    .unwrap();
    sidebar.handle_command(&cmd);

    let filters = sidebar.get_current_filters();
    assert_eq!(filters.province.as_deref(), Some("Northern"));
    assert_eq!(filters.age_group.as_deref(), Some("6-23 months"));
    assert_eq!(filters.year.as_deref(), Some("2020"));
}

#[test]
fn unboxed_filter_values_from_the_host_are_applied() {
    let (mut sidebar, _) = mounted(MemoryStorage::new());
    let cmd = HostCommand::parse(
        "updateSidebarFilters",
        json!({ "year": 2018, "province": "Kigali", "indicators": "stunting" }),
    )
    .unwrap();
    sidebar.handle_command(&cmd);

    let filters = sidebar.get_current_filters();
    assert_eq!(filters.year.as_deref(), Some("2018"));
    assert_eq!(filters.province.as_deref(), Some("Kigali"));
    assert_eq!(filters.indicators, vec!["stunting"]);
}

#[test]
fn malformed_commands_are_rejected_before_touching_state() {
    let (sidebar, bridge) = mounted(MemoryStorage::new());
    let before = sidebar.get_current_filters();

    for (handler, message) in [
        ("setActiveTab", json!("rankings")),
        ("setActiveTab", json!({ "tabName": 3 })),
        ("updateSidebarFilters", json!({ "year": [2018, 2019] })),
        ("updateSidebarFilters", json!(null)),
    ] {
        let err = HostCommand::parse(handler, message).unwrap_err();
        assert!(
            matches!(err, SidebarError::MalformedCommand { .. }),
            "{handler}: {err}"
        );
    }
    assert_eq!(sidebar.get_current_filters(), before);
    assert!(bridge.sent().is_empty());
}

fn option_values(options: &[nutrition_sidebar_core::catalog::SelectOption]) -> Vec<String> {
    options.iter().map(|o| o.value.to_string()).collect()
}

fn arb_patch() -> impl Strategy<Value = FilterPatch> {
    (
        proptest::option::of(proptest::sample::select(option_values(YEAR_FILTER.options))),
        proptest::option::of(proptest::sample::select(option_values(PROVINCE_FILTER.options))),
        proptest::option::of(proptest::sample::select(option_values(AGE_GROUP_FILTER.options))),
        proptest::option::of(proptest::sample::select(option_values(NUTRIENT_FILTER.options))),
        proptest::option::of(proptest::sample::subsequence(
            Indicator::ALL.iter().map(|i| i.value().to_string()).collect::<Vec<_>>(),
            0..=3,
        )),
    )
        .prop_map(|(year, province, age_group, nutrient, indicators)| FilterPatch {
            year,
            province,
            age_group,
            nutrient,
            indicators,
        })
}

fn merged(prior: FilterSelection, patch: &FilterPatch) -> FilterSelection {
    FilterSelection {
        year: patch.year.clone().or(prior.year),
        province: patch.province.clone().or(prior.province),
        age_group: patch.age_group.clone().or(prior.age_group),
        nutrient: patch.nutrient.clone().or(prior.nutrient),
        indicators: patch.indicators.clone().unwrap_or(prior.indicators),
    }
}

proptest! {
    #[test]
    fn toggle_parity(n in 0usize..24, start_collapsed in any::<bool>()) {
        let storage = MemoryStorage::new()
            .with_item("sidebar-collapsed", if start_collapsed { "true" } else { "false" });
        let view = storage.clone();
        let (mut sidebar, _) = mounted(storage);
        prop_assert_eq!(sidebar.is_collapsed(), start_collapsed);

        for _ in 0..n {
            sidebar.toggle_sidebar();
        }
        let expected = start_collapsed ^ (n % 2 == 1);
        prop_assert_eq!(sidebar.is_collapsed(), expected);
        if n > 0 {
            let stored = view.peek("sidebar-collapsed");
            prop_assert_eq!(stored.as_deref(), Some(if expected { "true" } else { "false" }));
        }
    }

    #[test]
    fn read_after_update_merges_with_prior(first in arb_patch(), second in arb_patch()) {
        let (mut sidebar, _) = mounted(MemoryStorage::new());
        sidebar.update_filters(&first);
        let prior = sidebar.get_current_filters();
        sidebar.update_filters(&second);
        prop_assert_eq!(sidebar.get_current_filters(), merged(prior, &second));
    }

    #[test]
    fn any_known_tab_becomes_the_only_active_one(
        picks in proptest::collection::vec(0..MENU_ENTRIES.len(), 1..8)
    ) {
        let (mut sidebar, bridge) = mounted(MemoryStorage::new());
        for &i in &picks {
            prop_assert!(sidebar.set_active_tab(MENU_ENTRIES[i].tab));
        }
        let last = MENU_ENTRIES[picks[picks.len() - 1]].tab;
        let active = sidebar.active_tab();
        prop_assert_eq!(active.as_deref(), Some(last));
        prop_assert_eq!(bridge.sent().len(), picks.len());
    }
}
