//! Pure query logic over quiz results: filtering, sorting, statistics,
//! grading and pagination. Nothing here touches storage.

use std::cmp::Ordering;

use validator::Validate;

use crate::{
    errors::AppResult,
    models::{
        domain::{FilterState, PerformanceBand, QuizAttemptRecord, SortDirection, SortKey},
        dto::{PageRequest, PageResult, ResultStatistics},
    },
};

/// Grade breakpoints, highest first.
const GRADE_SCALE: [(f64, &str, &str); 7] = [
    (90.0, "A+", "Outstanding performance! Exceptional mastery of the subject."),
    (80.0, "A", "Excellent work! Strong understanding of the concepts."),
    (70.0, "B+", "Very good performance. Keep up the consistent effort."),
    (60.0, "B", "Good effort. A solid grasp of most topics."),
    (50.0, "C+", "Satisfactory. Review the weaker areas to improve."),
    (40.0, "C", "Fair attempt. More practice is recommended."),
    (30.0, "D", "Needs improvement. Revisit the core material."),
];
const FAILING_GRADE: (&str, &str) = ("F", "Unsatisfactory. Please study the material and try again.");

pub fn grade_for(percentage: f64) -> &'static str {
    GRADE_SCALE
        .iter()
        .find(|(min, _, _)| percentage >= *min)
        .map(|(_, grade, _)| *grade)
        .unwrap_or(FAILING_GRADE.0)
}

pub fn remark_for(percentage: f64) -> &'static str {
    GRADE_SCALE
        .iter()
        .find(|(min, _, _)| percentage >= *min)
        .map(|(_, _, remark)| *remark)
        .unwrap_or(FAILING_GRADE.1)
}

fn compare(a: &QuizAttemptRecord, b: &QuizAttemptRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.completed_at.cmp(&b.completed_at),
        SortKey::Name => a
            .student_name
            .to_lowercase()
            .cmp(&b.student_name.to_lowercase()),
        SortKey::Id => a.student_id.to_lowercase().cmp(&b.student_id.to_lowercase()),
        SortKey::Score => a.score_percentage.total_cmp(&b.score_percentage),
    }
}

/// Records matching `state`, sorted by its key and direction. The input is
/// left untouched. Sorting is stable, so ties keep their relative order.
pub fn apply_filters(results: &[QuizAttemptRecord], state: &FilterState) -> Vec<QuizAttemptRecord> {
    let needle = state.search.trim().to_lowercase();

    let mut filtered: Vec<QuizAttemptRecord> = results
        .iter()
        .filter(|r| {
            needle.is_empty()
                || r.student_name.to_lowercase().contains(&needle)
                || r.student_id.to_lowercase().contains(&needle)
        })
        .filter(|r| state.band.matches(r.score_percentage))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| {
        let ordering = compare(a, b, state.sort_key);
        match state.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    filtered
}

/// Aggregates over exactly the given records; `None` when there are none.
pub fn compute_statistics(filtered: &[QuizAttemptRecord]) -> Option<ResultStatistics> {
    if filtered.is_empty() {
        return None;
    }

    let scores = filtered.iter().map(|r| r.score_percentage);
    let sum: f64 = scores.clone().sum();
    let highest = scores.clone().fold(f64::NEG_INFINITY, f64::max);
    let lowest = scores.fold(f64::INFINITY, f64::min);

    let mut stats = ResultStatistics {
        total: filtered.len(),
        average: (sum / filtered.len() as f64).round() as i64,
        highest,
        lowest,
        excellent: 0,
        good: 0,
        average_count: 0,
        poor: 0,
    };

    for record in filtered {
        match record.band() {
            PerformanceBand::Excellent => stats.excellent += 1,
            PerformanceBand::Good => stats.good += 1,
            PerformanceBand::Average => stats.average_count += 1,
            PerformanceBand::Poor => stats.poor += 1,
        }
    }

    Some(stats)
}

/// One page of an already filtered sequence. Pages past the end are empty.
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> AppResult<PageResult<T>> {
    request.validate()?;

    let total = items.len();
    let start = (request.page - 1).saturating_mul(request.page_size).min(total);
    let end = start.saturating_add(request.page_size).min(total);

    Ok(PageResult {
        items: items[start..end].to_vec(),
        page: request.page,
        page_size: request.page_size,
        total,
        total_pages: total.div_ceil(request.page_size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::AppError, models::domain::BandFilter, test_utils::fixtures::record};
    use chrono::{Duration, Utc};

    #[test]
    fn test_grade_breakpoints() {
        assert_eq!(grade_for(100.0), "A+");
        assert_eq!(grade_for(90.0), "A+");
        assert_eq!(grade_for(89.0), "A");
        assert_eq!(grade_for(80.0), "A");
        assert_eq!(grade_for(79.5), "B+");
        assert_eq!(grade_for(70.0), "B+");
        assert_eq!(grade_for(60.0), "B");
        assert_eq!(grade_for(50.0), "C+");
        assert_eq!(grade_for(40.0), "C");
        assert_eq!(grade_for(30.0), "D");
        assert_eq!(grade_for(29.9), "F");
        assert_eq!(grade_for(0.0), "F");
        assert_eq!(grade_for(-5.0), "F");
        assert_eq!(grade_for(150.0), "A+");
        assert_eq!(grade_for(f64::NAN), "F");
    }

    #[test]
    fn test_grade_is_monotonically_non_increasing() {
        let rank = |grade: &str| ["A+", "A", "B+", "B", "C+", "C", "D", "F"]
            .iter()
            .position(|g| *g == grade)
            .unwrap();

        let mut previous = rank(grade_for(-10.0));
        for tenth in -100..=1100 {
            let current = rank(grade_for(tenth as f64 / 10.0));
            assert!(current <= previous, "grade got worse at {}", tenth as f64 / 10.0);
            previous = current;
        }
    }

    #[test]
    fn test_remarks_follow_grade_bands() {
        assert!(remark_for(95.0).starts_with("Outstanding"));
        assert!(remark_for(85.0).starts_with("Excellent"));
        assert!(remark_for(10.0).starts_with("Unsatisfactory"));
        assert_ne!(remark_for(69.0), remark_for(70.0));
    }

    #[test]
    fn test_search_matches_name_or_id_case_insensitively() {
        let results = vec![
            record("1", "Alice", "S100", 70.0, Utc::now()),
            record("2", "Bob", "S200", 70.0, Utc::now()),
        ];

        let by_id = apply_filters(&results, &FilterState::default().with_search("s1"));
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].student_id, "S100");

        let by_name = apply_filters(&results, &FilterState::default().with_search("BO"));
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].student_name, "Bob");

        let blank = apply_filters(&results, &FilterState::default().with_search("   "));
        assert_eq!(blank.len(), 2);
    }

    #[test]
    fn test_band_filter() {
        let results = vec![
            record("1", "A", "1", 95.0, Utc::now()),
            record("2", "B", "2", 79.9, Utc::now()),
            record("3", "C", "3", 40.0, Utc::now()),
            record("4", "D", "4", 39.0, Utc::now()),
        ];

        let good = apply_filters(&results, &FilterState::default().with_band(BandFilter::Good));
        assert_eq!(good.len(), 1);
        assert_eq!(good[0].score_percentage, 79.9);

        let average = apply_filters(&results, &FilterState::default().with_band(BandFilter::Average));
        assert_eq!(average[0].score_percentage, 40.0);
    }

    #[test]
    fn test_sorting_each_key() {
        let now = Utc::now();
        let results = vec![
            record("1", "charlie", "s3", 50.0, now - Duration::days(1)),
            record("2", "Alice", "S1", 90.0, now - Duration::days(3)),
            record("3", "bob", "s2", 70.0, now - Duration::days(2)),
        ];

        let names = |state: FilterState| -> Vec<String> {
            apply_filters(&results, &state)
                .into_iter()
                .map(|r| r.student_name)
                .collect()
        };

        assert_eq!(
            names(FilterState::default().with_sort(SortKey::Name, SortDirection::Asc)),
            vec!["Alice", "bob", "charlie"]
        );
        assert_eq!(
            names(FilterState::default().with_sort(SortKey::Id, SortDirection::Desc)),
            vec!["charlie", "bob", "Alice"]
        );
        assert_eq!(
            names(FilterState::default().with_sort(SortKey::Score, SortDirection::Desc)),
            vec!["Alice", "bob", "charlie"]
        );
        assert_eq!(
            names(FilterState::default().with_sort(SortKey::Date, SortDirection::Desc)),
            vec!["charlie", "bob", "Alice"]
        );
        assert_eq!(
            names(FilterState::default().with_sort(SortKey::Date, SortDirection::Asc)),
            vec!["Alice", "bob", "charlie"]
        );
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let now = Utc::now();
        let results = vec![
            record("first", "A", "1", 60.0, now),
            record("second", "B", "2", 60.0, now),
            record("third", "C", "3", 60.0, now),
        ];

        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let ids: Vec<_> = apply_filters(
                &results,
                &FilterState::default().with_sort(SortKey::Score, direction),
            )
            .into_iter()
            .filter_map(|r| r.id)
            .collect();
            assert_eq!(ids, vec!["first", "second", "third"]);
        }
    }

    #[test]
    fn test_apply_filters_is_idempotent_and_pure() {
        let now = Utc::now();
        let results = vec![
            record("1", "Zed", "S10", 45.0, now - Duration::hours(5)),
            record("2", "Amy", "S11", 85.0, now - Duration::hours(1)),
            record("3", "Max", "X12", 85.0, now - Duration::hours(3)),
            record("4", "Sam", "S13", 10.0, now),
        ];
        let snapshot = results.clone();
        let state = FilterState::default()
            .with_search("s1")
            .with_sort(SortKey::Score, SortDirection::Desc);

        let once = apply_filters(&results, &state);
        let twice = apply_filters(&once, &state);

        assert_eq!(once, twice);
        assert_eq!(results, snapshot);
    }

    #[test]
    fn test_statistics_empty_is_none() {
        assert!(compute_statistics(&[]).is_none());
    }

    #[test]
    fn test_statistics_over_filtered_set() {
        let now = Utc::now();
        let results = vec![
            record("1", "A", "1", 95.0, now),
            record("2", "B", "2", 65.0, now),
            record("3", "C", "3", 35.0, now),
            record("4", "D", "4", 50.0, now),
        ];

        let stats = compute_statistics(&results).unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.average, 61); // 245 / 4 = 61.25
        assert_eq!(stats.highest, 95.0);
        assert_eq!(stats.lowest, 35.0);
        assert_eq!(
            stats.excellent + stats.good + stats.average_count + stats.poor,
            stats.total
        );

        let filtered = apply_filters(&results, &FilterState::default().with_band(BandFilter::Poor));
        let poor_stats = compute_statistics(&filtered).unwrap();
        assert_eq!(poor_stats.total, 1);
        assert_eq!(poor_stats.average, 35);
        assert_eq!(poor_stats.poor, 1);
    }

    #[test]
    fn test_statistics_average_rounds_half_up() {
        let now = Utc::now();
        let results = vec![record("1", "A", "1", 60.0, now), record("2", "B", "2", 61.0, now)];
        assert_eq!(compute_statistics(&results).unwrap().average, 61);
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=23).collect();

        let page = paginate(&items, PageRequest::new(3, 10)).unwrap();
        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.total, 23);
        assert_eq!(page.total_pages, 3);

        let beyond = paginate(&items, PageRequest::new(9, 10)).unwrap();
        assert!(beyond.items.is_empty());

        let invalid = paginate(&items, PageRequest::new(0, 10));
        assert!(matches!(invalid, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate::<u32>(&[], PageRequest::first(10)).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }
}
