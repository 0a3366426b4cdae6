//! Static menu and filter definitions.

use crate::models::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    /// Tab identifier (`data-tab`), forwarded to the host on selection
    pub tab: &'static str,
    /// Font Awesome icon class, e.g. `fa-flag`
    pub icon: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// A `<select>` filter control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectFilter {
    /// Element id of the `<select>`
    pub id: &'static str,
    pub label: &'static str,
    pub options: &'static [SelectOption],
}

const fn opt(value: &'static str, label: &'static str) -> SelectOption {
    SelectOption { value, label }
}

const fn entry(tab: &'static str, icon: &'static str, label: &'static str) -> MenuEntry {
    MenuEntry { tab, icon, label }
}

pub const MENU_ENTRIES: &[MenuEntry] = &[
    entry("language", "fa-globe", "Language"),
    entry("overview", "fa-flag", "National Overview"),
    entry("rankings", "fa-trophy", "District Rankings"),
    entry("regional", "fa-globe-africa", "Regional Comparison"),
    entry("trends", "fa-chart-line", "Trend Analysis"),
    entry("predictions", "fa-flask", "Predictive Analytics"),
    entry("policy", "fa-lightbulb", "Policy Advisor"),
    entry("explorer", "fa-search", "Data Explorer"),
    entry("impact", "fa-medal", "Impact Assessment"),
    entry("reports", "fa-download", "Export & Reports"),
];

pub const YEAR_FILTER: SelectFilter = SelectFilter {
    id: "filter-year",
    label: "Year",
    options: &[
        opt("2020", "2020"),
        opt("2019", "2019"),
        opt("2018", "2018"),
        opt("2017", "2017"),
        opt("2016", "2016"),
    ],
};

pub const PROVINCE_FILTER: SelectFilter = SelectFilter {
    id: "filter-province",
    label: "Province",
    options: &[
        opt("all", "All Provinces"),
        opt("Kigali", "Kigali"),
        opt("Northern", "Northern"),
        opt("Southern", "Southern"),
        opt("Eastern", "Eastern"),
        opt("Western", "Western"),
    ],
};

pub const AGE_GROUP_FILTER: SelectFilter = SelectFilter {
    id: "filter-age-group",
    label: "Urwego rw'amavuko",
    options: &[
        opt("all", "All Age Groups"),
        opt("0-6 months", "0-6 months"),
        opt("6-23 months", "6-23 months"),
        opt("24-59 months", "24-59 months"),
    ],
};

pub const NUTRIENT_FILTER: SelectFilter = SelectFilter {
    id: "filter-nutrient",
    label: "Ibiribwa by'ingenzi",
    options: &[
        opt("all", "All Nutrients"),
        opt("Iron", "Iron"),
        opt("Vitamin A", "Vitamin A"),
        opt("Zinc", "Zinc"),
        opt("Protein", "Protein"),
    ],
};

/// Scalar filters in display order: year, province, age group, nutrient.
pub const SELECT_FILTERS: [&SelectFilter; 4] = [
    &YEAR_FILTER,
    &PROVINCE_FILTER,
    &AGE_GROUP_FILTER,
    &NUTRIENT_FILTER,
];

pub const INDICATORS_LABEL: &str = "Ibimenyetso";

/// Checkbox element id for an indicator.
#[must_use]
pub fn indicator_checkbox_id(indicator: Indicator) -> String {
    format!("indicator-{}", indicator.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tab_identifiers_are_unique() {
        let tabs: HashSet<_> = MENU_ENTRIES.iter().map(|e| e.tab).collect();
        assert_eq!(tabs.len(), MENU_ENTRIES.len());
    }

    #[test]
    fn option_counts_match_dashboard() {
        assert_eq!(YEAR_FILTER.options.len(), 5);
        assert_eq!(PROVINCE_FILTER.options.len(), 6);
        assert_eq!(AGE_GROUP_FILTER.options.len(), 4);
        assert_eq!(NUTRIENT_FILTER.options.len(), 5);
        assert_eq!(Indicator::ALL.len(), 3);
    }

    #[test]
    fn checkbox_ids() {
        assert_eq!(indicator_checkbox_id(Indicator::Wasting), "indicator-wasting");
    }
}
