//! Catalog sources: bundled seed data, local JSON files, and remote fetch.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use scholar_core::{CatalogError, CatalogSource, Opportunity, OpportunityCategory};

/// Bundled starter catalog for first runs and demos.
pub struct SeedCatalog;

#[async_trait]
impl CatalogSource for SeedCatalog {
    async fn load(&self) -> Result<Vec<Opportunity>, CatalogError> {
        Ok(seed_catalog())
    }

    fn name(&self) -> &str {
        "seed"
    }
}

/// Reads a JSON array of opportunities from disk.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for JsonFileSource {
    async fn load(&self) -> Result<Vec<Opportunity>, CatalogError> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn name(&self) -> &str {
        "json-file"
    }
}

/// Fetches a JSON array of opportunities over HTTP.
pub struct HttpCatalogSource {
    url: String,
    client: reqwest::Client,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn load(&self) -> Result<Vec<Opportunity>, CatalogError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CatalogError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Fetch(format!(
                "{} returned {}",
                self.url,
                response.status()
            )));
        }

        response
            .json::<Vec<Opportunity>>()
            .await
            .map_err(|e| CatalogError::Fetch(e.to_string()))
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn entry(
    id: &str,
    title: &str,
    category: &str,
    amount: Option<f64>,
    deadline_days: Option<i64>,
    requirements: &[&str],
    tags: &[&str],
    description: &str,
) -> Opportunity {
    Opportunity {
        id: id.to_string(),
        title: title.to_string(),
        category: OpportunityCategory::from(category.to_string()),
        deadline: deadline_days.map(|d| Utc::now() + Duration::days(d)),
        amount,
        requirements: requirements.iter().map(|r| r.to_string()).collect(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        description: description.to_string(),
    }
}

/// Starter dataset. Deadlines are relative to load time so the bundled
/// entries stay live instead of aging out.
pub fn seed_catalog() -> Vec<Opportunity> {
    vec![
        entry(
            "seed-001",
            "STEM Futures Scholarship",
            "stem",
            Some(5_000.0),
            Some(45),
            &["Declared STEM major", "Minimum 3.0 GPA"],
            &["engineering", "science", "technology"],
            "Annual award for undergraduates pursuing a degree in science, \
             technology, engineering, or mathematics.",
        ),
        entry(
            "seed-002",
            "Community Leaders Grant",
            "community",
            Some(2_500.0),
            Some(20),
            &["Open to all students with 50+ volunteer hours"],
            &["service", "leadership"],
            "Recognizes sustained volunteer service and local impact.",
        ),
        entry(
            "seed-003",
            "General Excellence Award",
            "general",
            Some(1_000.0),
            None,
            &["Open to all students"],
            &["merit"],
            "No-essay merit award drawn monthly from the applicant pool.",
        ),
        entry(
            "seed-004",
            "Women in Engineering Fellowship",
            "stem",
            Some(7_500.0),
            Some(60),
            &["Women pursuing an engineering degree", "Minimum 3.2 GPA"],
            &["engineering", "women"],
            "Fellowship supporting women entering mechanical, electrical, \
             or software engineering programs.",
        ),
        entry(
            "seed-005",
            "Creative Arts Portfolio Prize",
            "arts",
            Some(3_000.0),
            Some(14),
            &["Portfolio of original work", "Enrolled in a visual or performing arts program"],
            &["portfolio", "visual-arts", "music"],
            "Juried prize for outstanding student portfolios across visual \
             and performing arts disciplines.",
        ),
        entry(
            "seed-006",
            "First-Generation Achievers Scholarship",
            "general",
            Some(4_000.0),
            Some(30),
            &["First-generation college student", "Open to all students regardless of major"],
            &["first-gen", "access"],
            "Supports students who are the first in their family to attend \
             college.",
        ),
        entry(
            "seed-007",
            "Student Athlete Honor Roll Award",
            "athletics",
            Some(2_000.0),
            Some(90),
            &["Varsity athlete", "Minimum 3.5 GPA"],
            &["sports", "academics"],
            "For athletes who hold honor-roll standing while competing at \
             the varsity level.",
        ),
        entry(
            "seed-008",
            "Future Business Leaders Grant",
            "business",
            Some(3_500.0),
            Some(25),
            &["Business, finance, or economics major", "One-page venture pitch"],
            &["entrepreneurship", "finance"],
            "Grant for students with a concrete plan to launch or grow a \
             venture during their studies.",
        ),
        entry(
            "seed-009",
            "Computer Science Merit Scholarship",
            "stem",
            Some(6_000.0),
            Some(10),
            &["Computer science or software engineering major", "Project portfolio"],
            &["computer-science", "software"],
            "Merit scholarship for computer science students with a public \
             portfolio of shipped projects.",
        ),
        entry(
            "seed-010",
            "Healthcare Heroes Scholarship",
            "healthcare",
            Some(4_500.0),
            Some(40),
            &["Nursing, pre-med, or allied health major"],
            &["nursing", "medicine"],
            "For students committed to clinical careers, with preference \
             for those already volunteering in care settings.",
        ),
        entry(
            "seed-011",
            "Undergraduate Research Stipend",
            "stem",
            Some(1_500.0),
            Some(75),
            &["Faculty research sponsor", "Research proposal"],
            &["research", "lab"],
            "Semester stipend for undergraduates joining a faculty-led \
             research project.",
        ),
        entry(
            "seed-012",
            "Hometown Booster Scholarship",
            "community",
            None,
            Some(55),
            &["Open to all students from participating counties"],
            &["local", "service"],
            "Amount varies by county fund. Backed by local business \
             sponsors for students staying in the region.",
        ),
    ]
}
