//! Selection policy: live-deadline filter, field-of-study matching, and the
//! fallback default list.

use chrono::{DateTime, Utc};
use scholar_core::{Opportunity, OpportunityCategory, UserProfile};

/// Cap applied to the fallback default list.
const FALLBACK_CAP: usize = 10;

/// Requirement phrase that marks an opportunity as broadly applicable.
const OPEN_TO_ALL: &str = "open to all students";

const BASE_SCORE: u32 = 40;
const FIELD_WEIGHT: u32 = 35;
const GRADE_WEIGHT: u32 = 15;
const TAG_WEIGHT: u32 = 10;

/// Select opportunities for a profile, preserving catalog order.
///
/// Entries past their deadline are dropped first. An absent or incomplete
/// profile gets the fallback default list, as does a complete profile whose
/// field of study matches nothing. Field-of-study matches are uncapped.
pub fn select_matches(
    profile: Option<&UserProfile>,
    catalog: &[Opportunity],
    now: DateTime<Utc>,
) -> Vec<Opportunity> {
    let live: Vec<&Opportunity> = catalog.iter().filter(|o| !o.is_expired(now)).collect();

    let field = match profile {
        Some(p) if p.is_complete() => p.field_of_study.trim().to_lowercase(),
        _ => return fallback_list(&live),
    };

    let matched: Vec<Opportunity> = live
        .iter()
        .filter(|o| text_blob(o).contains(&field))
        .map(|o| (*o).clone())
        .collect();

    if matched.is_empty() {
        fallback_list(&live)
    } else {
        matched
    }
}

/// Relevance score in [0, 100] for pairing a profile with an opportunity.
///
/// Additive weights in the same spirit as the selection policy: a
/// field-of-study hit in the opportunity text counts the most, then a
/// grade-level mention in the requirements, then tag overlap with the field
/// of study. Absent or incomplete profiles score the base only.
pub fn match_percentage(profile: Option<&UserProfile>, opportunity: &Opportunity) -> u8 {
    let mut score = BASE_SCORE;

    if let Some(p) = profile.filter(|p| p.is_complete()) {
        let field = p.field_of_study.trim().to_lowercase();
        let grade = p.grade_level.trim().to_lowercase();

        if text_blob(opportunity).contains(&field) {
            score += FIELD_WEIGHT;
        }
        if opportunity
            .requirements
            .iter()
            .any(|r| r.to_lowercase().contains(&grade))
        {
            score += GRADE_WEIGHT;
        }
        if opportunity
            .tags
            .iter()
            .any(|t| !t.is_empty() && field.contains(&t.to_lowercase()))
        {
            score += TAG_WEIGHT;
        }
    }

    score.min(100) as u8
}

/// Generic entries shown when no profile-specific match applies: category
/// `general` or an "open to all students" requirement, capped.
fn fallback_list(live: &[&Opportunity]) -> Vec<Opportunity> {
    live.iter()
        .filter(|o| {
            o.category == OpportunityCategory::General
                || o.requirements
                    .iter()
                    .any(|r| r.to_lowercase().contains(OPEN_TO_ALL))
        })
        .take(FALLBACK_CAP)
        .map(|o| (*o).clone())
        .collect()
}

/// Searchable text for one opportunity: title, category, description, and
/// requirements, space-joined and lower-cased.
fn text_blob(opportunity: &Opportunity) -> String {
    let mut blob = String::with_capacity(
        opportunity.title.len() + opportunity.description.len() + 32,
    );
    blob.push_str(&opportunity.title);
    blob.push(' ');
    blob.push_str(opportunity.category.as_str());
    blob.push(' ');
    blob.push_str(&opportunity.description);
    for requirement in &opportunity.requirements {
        blob.push(' ');
        blob.push_str(requirement);
    }
    blob.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn opportunity(id: &str, category: OpportunityCategory, title: &str) -> Opportunity {
        Opportunity {
            id: id.to_string(),
            title: title.to_string(),
            category,
            deadline: Some(Utc::now() + Duration::days(30)),
            amount: Some(1_000.0),
            requirements: vec![],
            tags: vec![],
            description: String::new(),
        }
    }

    fn complete_profile(field: &str) -> UserProfile {
        UserProfile {
            name: "Jordan Lee".to_string(),
            field_of_study: field.to_string(),
            grade_level: "Junior".to_string(),
            gender: "Female".to_string(),
            ethnicity: "Asian".to_string(),
        }
    }

    fn sample_catalog() -> Vec<Opportunity> {
        vec![
            opportunity("1", OpportunityCategory::General, "General Merit Award"),
            opportunity("2", OpportunityCategory::Stem, "Computer Science Scholarship"),
            {
                let mut o = opportunity("3", OpportunityCategory::Arts, "Portfolio Prize");
                o.requirements = vec!["Open To All Students".to_string()];
                o
            },
            opportunity("4", OpportunityCategory::Stem, "Nursing Futures Grant"),
        ]
    }

    #[test]
    fn absent_profile_gets_fallback_list() {
        let catalog = sample_catalog();
        let matched = select_matches(None, &catalog, Utc::now());
        let ids: Vec<_> = matched.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn incomplete_profile_gets_fallback_list() {
        let catalog = sample_catalog();
        let mut profile = complete_profile("Computer Science");
        profile.gender = "  ".to_string();

        let matched = select_matches(Some(&profile), &catalog, Utc::now());
        let ids: Vec<_> = matched.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn complete_profile_matches_field_of_study_uncapped() {
        let mut catalog = Vec::new();
        for i in 0..12 {
            catalog.push(opportunity(
                &format!("cs-{i}"),
                OpportunityCategory::Stem,
                &format!("Computer Science Award {i}"),
            ));
        }
        let profile = complete_profile("computer science");

        let matched = select_matches(Some(&profile), &catalog, Utc::now());
        assert_eq!(matched.len(), 12);
        let ids: Vec<_> = matched.iter().map(|o| o.id.as_str()).collect();
        let expected: Vec<_> = catalog.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, expected, "catalog order must be preserved");
    }

    #[test]
    fn unmatched_field_falls_back() {
        let catalog = sample_catalog();
        let profile = complete_profile("Quantum Basket-Weaving");

        let matched = select_matches(Some(&profile), &catalog, Utc::now());
        let ids: Vec<_> = matched.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn field_matching_is_case_insensitive_and_trimmed() {
        let catalog = sample_catalog();
        let profile = complete_profile("  COMPUTER science  ");

        let matched = select_matches(Some(&profile), &catalog, Utc::now());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "2");
    }

    #[test]
    fn expired_entries_are_never_selected() {
        let mut catalog = sample_catalog();
        catalog[1].deadline = Some(Utc::now() - Duration::days(1));
        catalog[0].deadline = Some(Utc::now() - Duration::hours(1));
        let profile = complete_profile("Computer Science");

        let matched = select_matches(Some(&profile), &catalog, Utc::now());
        // The only field match is expired, so the policy falls back, and the
        // expired general entry is excluded from the fallback too.
        let ids: Vec<_> = matched.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["3"]);
    }

    #[test]
    fn fallback_list_caps_at_ten() {
        let mut catalog = Vec::new();
        for i in 0..12 {
            catalog.push(opportunity(
                &format!("gen-{i}"),
                OpportunityCategory::General,
                &format!("Award {i}"),
            ));
        }

        let matched = select_matches(None, &catalog, Utc::now());
        assert_eq!(matched.len(), 10);
        assert_eq!(matched[0].id, "gen-0");
        assert_eq!(matched[9].id, "gen-9");
    }

    #[test]
    fn no_deadline_counts_as_live() {
        let mut catalog = sample_catalog();
        catalog[0].deadline = None;

        let matched = select_matches(None, &catalog, Utc::now());
        assert!(matched.iter().any(|o| o.id == "1"));
    }

    #[test]
    fn match_percentage_scores_base_without_profile() {
        let catalog = sample_catalog();
        assert_eq!(match_percentage(None, &catalog[1]), 40);
    }

    #[test]
    fn match_percentage_adds_component_weights() {
        let mut opp = opportunity("x", OpportunityCategory::Stem, "Computer Science Scholarship");
        opp.requirements = vec!["Junior or senior standing".to_string()];
        opp.tags = vec!["science".to_string()];
        let profile = complete_profile("Computer Science");

        // base 40 + field 35 + grade 15 + tag 10
        assert_eq!(match_percentage(Some(&profile), &opp), 100);

        opp.requirements.clear();
        opp.tags.clear();
        assert_eq!(match_percentage(Some(&profile), &opp), 75);
    }

    #[test]
    fn match_percentage_ignores_incomplete_profile_fields() {
        let opp = opportunity("x", OpportunityCategory::Stem, "Computer Science Scholarship");
        let mut profile = complete_profile("Computer Science");
        profile.ethnicity = String::new();

        assert_eq!(match_percentage(Some(&profile), &opp), 40);
    }
}
