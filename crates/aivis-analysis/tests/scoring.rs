use aivis_analysis::{
    aggregate, analyze_pairs, find_mentions, render_csv, MatchOptions, DEFAULT_CONTEXT_CHARS,
};
use aivis_core::{BrandSet, ResponsePair};
use chrono::{TimeZone, Utc};

fn pairs(items: &[(&str, &str)]) -> Vec<ResponsePair> {
    items
        .iter()
        .map(|(prompt, text)| ResponsePair {
            prompt: (*prompt).to_string(),
            response_text: (*text).to_string(),
        })
        .collect()
}

#[test]
fn crm_scenario_counts_and_ranks() {
    let brands = BrandSet::from_names(["Salesforce", "HubSpot"]).unwrap();
    let input = pairs(&[
        ("best crm for startups?", "Salesforce is popular among startups"),
        ("free crm?", "Both HubSpot and Salesforce offer free tiers"),
    ]);
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

    let report =
        analyze_pairs("CRM software", brands, &input, now, MatchOptions::default()).unwrap();
    let agg = aggregate(&report.results, &report.brands);

    assert_eq!(agg.count("Salesforce"), Some(2));
    assert_eq!(agg.count("HubSpot"), Some(1));

    let order: Vec<String> = agg
        .leaderboard()
        .iter()
        .map(|row| row.brand.to_string())
        .collect();
    assert_eq!(order, vec!["Salesforce", "HubSpot"]);

    assert!((report.visibility_score - 100.0).abs() < f64::EPSILON);
    assert!(render_csv(&report).contains("Visibility Score,100.0%\n"));
}

#[test]
fn totals_equal_number_of_mentions() {
    let brands = BrandSet::from_names(["Salesforce", "HubSpot", "Zoho", "Pipedrive"]).unwrap();
    let input = pairs(&[
        ("a", "HubSpot, HubSpot and more HubSpot. Zohosoft is not Zoho."),
        ("b", "Pipedrive vs Salesforce vs pipedrive"),
        ("c", ""),
        ("d", "Nothing relevant"),
    ]);

    let report = analyze_pairs("CRM", brands, &input, Utc::now(), MatchOptions::default()).unwrap();
    let agg = aggregate(&report.results, &report.brands);

    let mention_objects: usize = report.results.iter().map(|r| r.mentions.len()).sum();
    let summed: usize = agg.counts().iter().map(|(_, n)| n).sum();
    assert_eq!(summed, mention_objects);
    assert_eq!(agg.total_mentions(), 7);
    assert_eq!(agg.prompts_with_mentions(), 2);

    assert!((0.0..=100.0).contains(&report.visibility_score));
    assert!(agg
        .leaderboard()
        .iter()
        .all(|row| row.visibility_percent <= 100));
}

#[test]
fn empty_input_scores_zero() {
    let brands = BrandSet::from_names(["Salesforce", "HubSpot"]).unwrap();
    let report = analyze_pairs("CRM", brands, &[], Utc::now(), MatchOptions::default()).unwrap();
    let agg = aggregate(&report.results, &report.brands);

    assert!((report.visibility_score - 0.0).abs() < f64::EPSILON);
    assert_eq!(agg.counts().len(), 2);
    assert!(agg.counts().iter().all(|(_, n)| *n == 0));
}

#[test]
fn default_context_is_forty_characters_each_side() {
    assert_eq!(DEFAULT_CONTEXT_CHARS, 40);
    let brands = BrandSet::from_names(["HubSpot"]).unwrap();
    let text = format!("{}HubSpot{}", "x ".repeat(30), " y".repeat(30));
    let mention = &find_mentions(&text, &brands)[0];
    assert_eq!(mention.position, 60);
    assert_eq!(mention.context.chars().count(), 40 + 7 + 40);
    assert!(mention.context.starts_with("x x"));
    assert!(mention.context.ends_with("y y"));
}
