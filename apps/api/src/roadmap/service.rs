//! Roadmap Service: resolves a job title to a roadmap, either from the canonical
//! library or by asking the completion backend.
//!
//! Flow (canonical): catalog lookup → library selection → `{roadmap, jobInfo}`.
//! Flow (AI):        prompt → one completion call → extractor → roadmap.
//!
//! Nothing is cached; every call recomputes its result.

use serde::Serialize;
use tracing::{debug, error, info};

use crate::errors::AppError;
use crate::jobs::catalog::{JobCatalog, JobRecord};
use crate::llm_client::CompletionBackend;
use crate::roadmap::diagram::build_diagram;
use crate::roadmap::extractor::parse_completion;
use crate::roadmap::library::RoadmapLibrary;
use crate::roadmap::models::Roadmap;
use crate::roadmap::prompts::build_roadmap_prompt;
use crate::roadmap::timeline::{build_timeline, TimelineItem};

/// Canonical roadmap merged with the job's metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRoadmap {
    pub roadmap: Roadmap,
    pub job_info: JobRecord,
}

/// Server-side rendering of a roadmap for clients that do not build diagrams themselves.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedRoadmap {
    pub diagram: String,
    /// `None` for branching roadmaps.
    pub timeline: Option<Vec<TimelineItem>>,
}

/// Looks the job up case-insensitively and attaches the canonical roadmap the library
/// selects for it.
pub fn resolve(
    catalog: &JobCatalog,
    library: &RoadmapLibrary,
    title: &str,
) -> Result<ResolvedRoadmap, AppError> {
    let job = catalog
        .find(title)
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    Ok(ResolvedRoadmap {
        roadmap: library.select(&job.title).clone(),
        job_info: job.clone(),
    })
}

/// Generates a roadmap for any title through the completion backend. Never falls back
/// to canonical data.
pub async fn resolve_ai(backend: &dyn CompletionBackend, title: &str) -> Result<Roadmap, AppError> {
    info!("Requesting AI roadmap for '{title}'");
    let prompt = build_roadmap_prompt(title);

    let envelope = backend.complete(&prompt).await.map_err(|e| {
        error!("Completion call failed for '{title}': {e}");
        AppError::AiTransport(e.to_string())
    })?;

    let roadmap = parse_completion(envelope)?;
    info!("AI roadmap for '{title}' has {} element(s)", roadmap.len());
    Ok(roadmap)
}

pub fn render(roadmap: &Roadmap) -> RenderedRoadmap {
    let diagram = build_diagram(roadmap);
    debug!(
        "Rendered {:?} roadmap: {} node(s), {} edge(s)",
        roadmap.shape(),
        diagram.node_count(),
        diagram.edge_count()
    );
    RenderedRoadmap {
        diagram: diagram.render(),
        timeline: build_timeline(roadmap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::{BrokenBackend, StubBackend};
    use crate::roadmap::library::SelectionPolicy;
    use serde_json::json;

    const CSV: &str = "\
job_title,job_description,average_salary,required_skills
Software Engineer,Builds software,$120000,\"Rust,Git\"
Data Scientist,Models data,$110000,Python
";

    const ROADMAPS: &str = r#"{
        "software engineer": [
            { "stepId": 1, "title": "Learn Basics", "startDate": "2024-01-01", "endDate": "2024-03-01" },
            { "stepId": 2, "title": "Build Projects", "startDate": "2024-03-01", "endDate": "2024-06-01" }
        ],
        "data scientist": [{ "id": "A", "label": "Statistics" }]
    }"#;

    fn fixtures(policy: SelectionPolicy) -> (JobCatalog, RoadmapLibrary) {
        (
            JobCatalog::from_reader(CSV.as_bytes()).unwrap(),
            RoadmapLibrary::from_json(ROADMAPS, policy).unwrap(),
        )
    }

    #[test]
    fn test_resolve_unknown_title_is_not_found() {
        let (catalog, library) = fixtures(SelectionPolicy::Fixed);
        let err = resolve(&catalog, &library, "Nonexistent").unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Job not found"));
    }

    #[test]
    fn test_resolve_matches_case_insensitively_and_returns_job_info() {
        let (catalog, library) = fixtures(SelectionPolicy::Fixed);
        let resolved = resolve(&catalog, &library, "software ENGINEER").unwrap();

        assert_eq!(resolved.job_info.title, "Software Engineer");
        assert_eq!(resolved.job_info.skills, ["Rust", "Git"]);
        assert_eq!(resolved.roadmap.len(), 2);
    }

    #[test]
    fn test_fixed_policy_gives_every_job_the_default_roadmap() {
        let (catalog, library) = fixtures(SelectionPolicy::Fixed);
        let se = resolve(&catalog, &library, "Software Engineer").unwrap();
        let ds = resolve(&catalog, &library, "Data Scientist").unwrap();
        assert_eq!(se.roadmap, ds.roadmap);
    }

    #[test]
    fn test_by_title_policy_gives_job_its_own_roadmap() {
        let (catalog, library) = fixtures(SelectionPolicy::ByTitle);
        let ds = resolve(&catalog, &library, "data scientist").unwrap();
        assert!(matches!(ds.roadmap, Roadmap::Branching(_)));
    }

    #[test]
    fn test_resolved_roadmap_wire_shape() {
        let (catalog, library) = fixtures(SelectionPolicy::Fixed);
        let value = serde_json::to_value(resolve(&catalog, &library, "Data Scientist").unwrap())
            .unwrap();
        assert_eq!(value["jobInfo"]["averageSalary"], "$110000");
        assert_eq!(value["roadmap"][0]["stepId"], 1);
    }

    #[tokio::test]
    async fn test_resolve_ai_parses_fenced_completion() {
        let backend = StubBackend::with_content(
            "Here you go:\n```json\n[{\"id\": \"A\", \"label\": \"Start\", \"next\": [{\"id\": \"B\", \"label\": \"Path 1\"}]}, {\"id\": \"B\", \"label\": \"End\"}]\n```",
        );

        let roadmap = resolve_ai(&backend, "Astronaut").await.unwrap();
        assert!(matches!(roadmap, Roadmap::Branching(ref nodes) if nodes.len() == 2));

        let prompt = backend.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("career roadmap for a Astronaut"));
    }

    #[tokio::test]
    async fn test_resolve_ai_does_not_need_a_known_job() {
        // The catalog is never consulted on the AI path.
        let backend = StubBackend::with_content(r#"[{"id": "A", "label": "Only"}]"#);
        assert!(resolve_ai(&backend, "Nonexistent").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_ai_invalid_envelope() {
        let backend = StubBackend::with_envelope(json!({ "error": "model overloaded" }));
        let err = resolve_ai(&backend, "Chef").await.unwrap_err();
        assert!(matches!(err, AppError::AiInvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_resolve_ai_unparseable_content() {
        let backend = StubBackend::with_content("Sorry, I cannot help with that.");
        match resolve_ai(&backend, "Chef").await {
            Err(AppError::AiParseFailure { raw, .. }) => {
                assert_eq!(raw, "Sorry, I cannot help with that.")
            }
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_ai_transport_failure() {
        let err = resolve_ai(&BrokenBackend, "Chef").await.unwrap_err();
        assert!(matches!(err, AppError::AiTransport(_)));
    }

    #[test]
    fn test_render_sequential_has_diagram_and_timeline() {
        let (_, library) = fixtures(SelectionPolicy::Fixed);
        let rendered = render(library.select("anything"));
        assert!(rendered.diagram.starts_with("graph TD\n"));
        assert!(rendered.diagram.contains("step1 --> step2"));
        assert_eq!(rendered.timeline.map(|t| t.len()), Some(2));
    }

    #[test]
    fn test_render_branching_has_no_timeline() {
        let (_, library) = fixtures(SelectionPolicy::ByTitle);
        let rendered = render(library.select("data scientist"));
        assert_eq!(rendered.diagram, "graph TD\nA[Statistics]\n");
        assert!(rendered.timeline.is_none());
    }
}
