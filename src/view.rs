//! Turns the full application collection plus the user's criteria into the
//! ordered list the table shows.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use feruca::Collator;

use crate::error::ParseError;
use crate::models::{ApplicationStatus, JobApplication, WorkType};

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    DateApplied,
    Company,
    Status,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::DateApplied => "date applied",
            SortKey::Company => "company",
            SortKey::Status => "status",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortKey::DateApplied => SortKey::Company,
            SortKey::Company => SortKey::Status,
            SortKey::Status => SortKey::DateApplied,
        }
    }
}

impl FromStr for SortKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" | "dateapplied" | "date-applied" | "date_applied" => Ok(SortKey::DateApplied),
            "company" => Ok(SortKey::Company),
            "status" => Ok(SortKey::Status),
            _ => Err(ParseError::SortKey(s.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(ParseError::SortDirection(s.to_string())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("asc"),
            SortDirection::Descending => f.write_str("desc"),
        }
    }
}

/// Everything the user picked in the filter controls. Rebuilt on each change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search_text: String,
    /// Empty means every work type passes.
    pub work_types: BTreeSet<WorkType>,
    /// Empty means every status passes.
    pub statuses: BTreeSet<ApplicationStatus>,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl FilterCriteria {
    pub fn is_unfiltered(&self) -> bool {
        self.search_text.is_empty() && self.work_types.is_empty() && self.statuses.is_empty()
    }

    pub fn matches(&self, app: &JobApplication) -> bool {
        self.matches_search(app) && self.matches_work_type(app) && self.matches_status(app)
    }

    fn matches_search(&self, app: &JobApplication) -> bool {
        if self.search_text.is_empty() {
            return true;
        }
        let needle = self.search_text.to_lowercase();
        app.company.to_lowercase().contains(&needle) || app.position.to_lowercase().contains(&needle)
    }

    // Unrecognized values are never members of a filter set, so they drop
    // out whenever the set is non-empty.
    fn matches_work_type(&self, app: &JobApplication) -> bool {
        self.work_types.is_empty()
            || (app.work_type.is_recognized() && self.work_types.contains(&app.work_type))
    }

    fn matches_status(&self, app: &JobApplication) -> bool {
        self.statuses.is_empty()
            || (app.status.is_recognized() && self.statuses.contains(&app.status))
    }

    fn compare(&self, collator: &mut Collator, a: &JobApplication, b: &JobApplication) -> Ordering {
        let ordering = match self.sort_key {
            SortKey::Company => collator.collate(a.company.as_str(), b.company.as_str()),
            SortKey::Status => collator.collate(a.status.label(), b.status.label()),
            // None < Some, so unreadable dates sort as the oldest
            SortKey::DateApplied => a.applied_on().cmp(&b.applied_on()),
        };
        self.sort_direction.apply(ordering)
    }
}

/// The records to display for `criteria`, in display order.
///
/// Pure: `all` is only read and the result holds its own copies. The sort is
/// stable, so records that compare equal keep their collection order in both
/// directions.
pub fn compute_visible_applications(
    all: &[JobApplication],
    criteria: &FilterCriteria,
) -> Vec<JobApplication> {
    let mut visible: Vec<JobApplication> =
        all.iter().filter(|app| criteria.matches(app)).cloned().collect();
    let mut collator = Collator::default();
    visible.sort_by(|a, b| criteria.compare(&mut collator, a, b));
    visible
}

/// Compares two labels the way a browser's `localeCompare` does, using the
/// root Unicode collation: accents and case only decide otherwise equal text.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    Collator::default().collate(a, b)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, after clamping.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice out one page. Out-of-range pages clamp to the nearest valid page.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total_items);

    Page {
        items: items[start..end].to_vec(),
        page,
        per_page,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str, company: &str, date: &str, status: &str) -> JobApplication {
        JobApplication {
            id: id.to_string(),
            company: company.to_string(),
            position: "Engineer".to_string(),
            date_applied: date.to_string(),
            work_type: WorkType::Remote,
            status: ApplicationStatus::from(status.to_string()),
            notes: None,
        }
    }

    fn ids(apps: &[JobApplication]) -> Vec<&str> {
        apps.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn newest_first_by_default() {
        let all = vec![app("1", "Acme", "2023-05-10", "Applied"), app("2", "Zeta", "2023-05-15", "Applied")];
        let visible = compute_visible_applications(&all, &FilterCriteria::default());
        assert_eq!(ids(&visible), ["2", "1"]);
    }

    #[test]
    fn bad_dates_sort_as_oldest() {
        let all = vec![
            app("1", "A", "2023-05-10", "Applied"),
            app("2", "B", "not a date", "Applied"),
            app("3", "C", "2021-01-01", "Applied"),
        ];
        let mut criteria = FilterCriteria {
            sort_direction: SortDirection::Ascending,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&compute_visible_applications(&all, &criteria)), ["2", "3", "1"]);

        criteria.sort_direction = SortDirection::Descending;
        assert_eq!(ids(&compute_visible_applications(&all, &criteria)), ["1", "3", "2"]);
    }

    #[test]
    fn company_sort_ignores_case() {
        let all = vec![
            app("1", "beta", "2023-01-01", "Applied"),
            app("2", "Alpha", "2023-01-01", "Applied"),
            app("3", "alpha", "2023-01-01", "Applied"),
        ];
        let criteria = FilterCriteria {
            sort_key: SortKey::Company,
            sort_direction: SortDirection::Ascending,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&compute_visible_applications(&all, &criteria)), ["3", "2", "1"]);
    }

    #[test]
    fn accented_names_sort_with_their_base_letter() {
        let all = vec![
            app("1", "Zeta", "2023-01-01", "Applied"),
            app("2", "Éclair", "2023-01-01", "Applied"),
            app("3", "Delta", "2023-01-01", "Applied"),
            app("4", "Ångström Labs", "2023-01-01", "Applied"),
        ];
        let mut criteria = FilterCriteria {
            sort_key: SortKey::Company,
            sort_direction: SortDirection::Ascending,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&compute_visible_applications(&all, &criteria)), ["4", "3", "2", "1"]);

        criteria.sort_direction = SortDirection::Descending;
        assert_eq!(ids(&compute_visible_applications(&all, &criteria)), ["1", "2", "3", "4"]);

        assert_eq!(locale_compare("Éclair", "Zeta"), Ordering::Less);
        assert_eq!(locale_compare("eclair", "Éclair"), Ordering::Less);
    }

    #[test]
    fn ties_keep_collection_order_in_both_directions() {
        let all = vec![
            app("1", "Same", "2023-01-01", "Offer"),
            app("2", "Other", "2023-02-01", "Applied"),
            app("3", "Same", "2023-03-01", "Offer"),
        ];
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let criteria = FilterCriteria {
                sort_key: SortKey::Status,
                sort_direction: direction,
                ..FilterCriteria::default()
            };
            let visible = compute_visible_applications(&all, &criteria);
            let offers: Vec<&str> = visible
                .iter()
                .filter(|a| a.status == ApplicationStatus::Offer)
                .map(|a| a.id.as_str())
                .collect();
            assert_eq!(offers, ["1", "3"]);
        }
    }

    #[test]
    fn unknown_status_sorts_by_raw_text() {
        let all = vec![
            app("1", "A", "2023-01-01", "Offer"),
            app("2", "B", "2023-01-01", "Ghosted"),
            app("3", "C", "2023-01-01", "Applied"),
        ];
        let criteria = FilterCriteria {
            sort_key: SortKey::Status,
            sort_direction: SortDirection::Ascending,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&compute_visible_applications(&all, &criteria)), ["3", "2", "1"]);
    }

    #[test]
    fn pagination_clamps_out_of_range_pages() {
        let items: Vec<u32> = (1..=23).collect();

        let first = paginate(&items, 0, 10);
        assert_eq!(first.page, 1);
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);

        let last = paginate(&items, 99, 10);
        assert_eq!(last.page, 3);
        assert_eq!(last.items, vec![21, 22, 23]);

        let empty = paginate::<u32>(&[], 4, 10);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());

        assert_eq!(paginate(&items, 2, 0).items, vec![2]);
    }

    #[test]
    fn sort_and_direction_parse_from_user_input() {
        assert_eq!("dateApplied".parse::<SortKey>().unwrap(), SortKey::DateApplied);
        assert_eq!("Company".parse::<SortKey>().unwrap(), SortKey::Company);
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Ascending);
        assert_eq!(
            "salary".parse::<SortKey>(),
            Err(ParseError::SortKey("salary".to_string()))
        );
    }
}
