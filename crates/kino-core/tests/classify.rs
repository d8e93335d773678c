//! Tests for chain partitioning.

use chrono::NaiveDate;
use kino_core::partition_by_chain;
use kino_model::{CanonicalScreening, ChainPartition};
use proptest::prelude::*;

fn screening(city: &str, cinema: &str, movie: &str, time: &str) -> CanonicalScreening {
    CanonicalScreening {
        date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        city: city.to_string(),
        movie_title: movie.to_string(),
        cinema_name: cinema.to_string(),
        time: time.to_string(),
        format: String::new(),
        language: String::new(),
        event_type: "regular".to_string(),
        day_name: String::new(),
        scraped_at: None,
    }
}

#[test]
fn groups_come_back_in_sync_order() {
    let records = vec![
        screening("Warszawa", "Kino Pionier", "Flow", "18:00"),
        screening("Warszawa", "Helios Blue City", "Flow", "18:00"),
        screening("Warszawa", "Multikino Złote Tarasy", "Flow", "18:00"),
        screening("Warszawa", "Cinema City Promenada", "Flow", "18:00"),
    ];

    let groups = partition_by_chain(&records);

    let chains: Vec<_> = groups.iter().map(|group| group.chain).collect();
    assert_eq!(chains, ChainPartition::ALL.to_vec());
    assert!(groups.iter().all(|group| group.len() == 1));
    assert_eq!(groups[3].records[0].cinema_name, "Kino Pionier");
}

#[test]
fn records_are_sorted_within_partition() {
    let records = vec![
        screening("Warszawa", "Multikino Targówek", "Flow", "20:00"),
        screening("Kraków", "Multikino Kraków", "Flow", "18:00"),
        screening("Warszawa", "Multikino Targówek", "Anora", "21:00"),
        screening("Warszawa", "Multikino Targówek", "Flow", "10:00"),
    ];

    let groups = partition_by_chain(&records);
    let multikino = &groups[1];

    let order: Vec<_> = multikino
        .records
        .iter()
        .map(|r| (r.city.as_str(), r.movie_title.as_str(), r.time.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Kraków", "Flow", "18:00"),
            ("Warszawa", "Anora", "21:00"),
            ("Warszawa", "Flow", "10:00"),
            ("Warszawa", "Flow", "20:00"),
        ]
    );
    assert_eq!(multikino.worksheet_rows()[0][1], "Kraków");
}

#[test]
fn empty_input_yields_empty_groups() {
    let groups = partition_by_chain(&[]);
    assert_eq!(groups.len(), ChainPartition::ALL.len());
    assert!(groups.iter().all(|group| group.is_empty()));
}

fn cinema_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Cinema City Mokotów".to_string()),
        Just("multikino Reduta".to_string()),
        Just("HELIOS Forum".to_string()),
        Just("Kino Amok".to_string()),
        "[a-zA-Z ]{0,16}",
    ]
}

proptest! {
    #[test]
    fn every_record_lands_in_exactly_one_matching_group(
        rows in prop::collection::vec(
            (cinema_name(), "[A-C]", "[0-2][0-9]:[0-5][0-9]"),
            0..40,
        )
    ) {
        let records: Vec<_> = rows
            .iter()
            .map(|(cinema, city, time)| screening(city, cinema, "Flow", time))
            .collect();

        let groups = partition_by_chain(&records);

        let total: usize = groups.iter().map(|group| group.len()).sum();
        prop_assert_eq!(total, records.len());
        for group in &groups {
            for record in &group.records {
                prop_assert_eq!(ChainPartition::classify(&record.cinema_name), group.chain);
            }
            prop_assert!(group
                .records
                .windows(2)
                .all(|pair| pair[0].presentation_key() <= pair[1].presentation_key()));
        }
    }
}
