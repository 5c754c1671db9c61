use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::config::MatchingSettings;
use crate::core::{
    all_stable_matchings, is_stable, rogue_pair, seeded_instance, MatchingError, PreferenceModel,
    StableMatcher,
};
use crate::models::{
    EnumerateRequest, EnumerateResponse, ErrorResponse, GenerateRequest, HealthResponse, Matching,
    PreferenceInstance, SolveRequest, SolveResponse, VerifyRequest, VerifyResponse,
};
use crate::services::SolutionCache;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<SolutionCache>,
    pub matching: MatchingSettings,
}

/// Configure all matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matching/solve", web::post().to(solve))
        .route("/matching/verify", web::post().to(verify))
        .route("/matching/enumerate", web::post().to(enumerate))
        .route("/matching/generate", web::post().to(generate))
        .route("/matching/cache", web::get().to(cache_stats))
        .route("/matching/cache", web::delete().to(clear_cache));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Solve endpoint
///
/// POST /api/v1/matching/solve
///
/// Request body:
/// ```json
/// {
///   "proposers": {"1": ["a", "b"], "2": ["b", "a"]},
///   "reviewers": {"a": [1, 2], "b": [2, 1]},
///   "verbose": false
/// }
/// ```
async fn solve(state: web::Data<AppState>, req: web::Json<SolveRequest>) -> impl Responder {
    let SolveRequest {
        proposers,
        reviewers,
        verbose,
    } = req.into_inner();
    let instance = PreferenceInstance::new(proposers, reviewers);

    if let Err(e) = check_size(&instance, state.matching.max_instance_size) {
        return error_response(&e);
    }

    if !verbose {
        if let Some(hit) = state.cache.get(&instance).await {
            tracing::debug!("Serving cached solution for {} proposers", instance.size());
            let mut response = (*hit).clone();
            response.cached = true;
            return HttpResponse::Ok().json(response);
        }
    }

    let key = instance.clone();
    let solved = web::block(move || solve_instance(&instance, verbose)).await;

    let response = match solved {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::info!("Rejected instance: {}", e);
            return error_response(&e);
        }
        Err(e) => return blocking_failure("Solver", e),
    };

    tracing::info!(
        "Solved instance with {} proposers in {} rounds",
        response.pairs.len(),
        response.rounds
    );

    if !verbose {
        state.cache.set(key, response.clone()).await;
    }

    HttpResponse::Ok().json(response)
}

fn solve_instance(instance: &PreferenceInstance, verbose: bool) -> Result<SolveResponse, MatchingError> {
    let model = PreferenceModel::from_instance(instance)?;
    let outcome = StableMatcher::with_trace(verbose).solve(&model)?;
    let stable = is_stable(&model, &outcome.assignment);

    Ok(SolveResponse {
        pairs: outcome.matching(&model),
        rounds: outcome.rounds,
        stable,
        trace: verbose.then_some(outcome.trace),
        cached: false,
    })
}

/// Verify endpoint
///
/// POST /api/v1/matching/verify
///
/// Request body:
/// ```json
/// {
///   "proposers": {"1": ["a", "b"], "2": ["b", "a"]},
///   "reviewers": {"a": [1, 2], "b": [2, 1]},
///   "pairs": [{"proposer": "1", "reviewer": "b"}, {"proposer": "2", "reviewer": "a"}]
/// }
/// ```
async fn verify(state: web::Data<AppState>, req: web::Json<VerifyRequest>) -> impl Responder {
    let VerifyRequest {
        proposers,
        reviewers,
        pairs,
    } = req.into_inner();
    let instance = PreferenceInstance::new(proposers, reviewers);

    let result = check_size(&instance, state.matching.max_instance_size)
        .and_then(|_| PreferenceModel::from_instance(&instance))
        .and_then(|model| rogue_pair(&model, &Matching::new(pairs)));

    match result {
        Ok(rogue) => {
            tracing::info!("Verified matching: stable={}", rogue.is_none());
            HttpResponse::Ok().json(VerifyResponse {
                stable: rogue.is_none(),
                rogue_pair: rogue,
            })
        }
        Err(e) => error_response(&e),
    }
}

/// Enumerate endpoint
///
/// POST /api/v1/matching/enumerate
///
/// Lists every stable matching by brute force; limited to small instances.
async fn enumerate(state: web::Data<AppState>, req: web::Json<EnumerateRequest>) -> impl Responder {
    let EnumerateRequest {
        proposers,
        reviewers,
    } = req.into_inner();
    let instance = PreferenceInstance::new(proposers, reviewers);
    let size = instance.size();

    if let Err(e) = check_size(&instance, state.matching.max_enumeration_size) {
        return error_response(&e);
    }

    let limit = state.matching.max_enumeration_size;
    let enumerated = web::block(move || enumerate_instance(&instance, limit)).await;

    match enumerated {
        Ok(Ok(matchings)) => {
            tracing::info!(
                "Enumerated {} stable matchings for {} proposers",
                matchings.len(),
                size
            );
            HttpResponse::Ok().json(EnumerateResponse {
                count: matchings.len(),
                matchings,
            })
        }
        Ok(Err(e)) => error_response(&e),
        Err(e) => blocking_failure("Enumeration", e),
    }
}

fn enumerate_instance(
    instance: &PreferenceInstance,
    limit: usize,
) -> Result<Vec<Matching>, MatchingError> {
    let model = PreferenceModel::from_instance(instance)?;
    let stable = all_stable_matchings(&model, limit)?;
    Ok(stable
        .iter()
        .map(|assignment| assignment.to_matching(&model))
        .collect())
}

/// Generate endpoint
///
/// POST /api/v1/matching/generate
///
/// Request body:
/// ```json
/// {
///   "size": 4,
///   "seed": 7
/// }
/// ```
async fn generate(state: web::Data<AppState>, req: web::Json<GenerateRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let limit = state.matching.max_instance_size;
    if req.size > limit {
        return error_response(&MatchingError::InstanceTooLarge {
            size: req.size,
            limit,
        });
    }

    let size = req.size;
    let seed = req.seed.unwrap_or(state.matching.default_seed);
    tracing::info!("Generating instance of size {} with seed {}", size, seed);

    match web::block(move || seeded_instance(size, seed)).await {
        Ok(instance) => HttpResponse::Ok().json(instance),
        Err(e) => blocking_failure("Generator", e),
    }
}

/// Cache statistics endpoint
async fn cache_stats(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.cache.stats())
}

/// Drop every cached solution
///
/// DELETE /api/v1/matching/cache
async fn clear_cache(state: web::Data<AppState>) -> impl Responder {
    state.cache.invalidate_all();
    tracing::info!("Solution cache cleared on request");
    HttpResponse::NoContent().finish()
}

fn blocking_failure(task: &str, err: actix_web::error::BlockingError) -> HttpResponse {
    tracing::error!("{} task failed: {}", task, err);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: format!("{} failed", task),
        message: err.to_string(),
        status_code: 500,
    })
}

fn check_size(instance: &PreferenceInstance, limit: usize) -> Result<(), MatchingError> {
    let size = instance.proposers.len().max(instance.reviewers.len());
    if size > limit {
        return Err(MatchingError::InstanceTooLarge { size, limit });
    }
    Ok(())
}

fn error_response(err: &MatchingError) -> HttpResponse {
    let (error, status_code) = match err {
        MatchingError::MalformedInput { .. } => ("Malformed input", 400),
        MatchingError::UnequalGroupSize { .. } => ("Unequal group sizes", 400),
        MatchingError::InstanceTooLarge { .. } => ("Instance too large", 422),
        MatchingError::NonTermination { .. } => ("Matching did not terminate", 500),
    };

    let body = ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        status_code,
    };

    match status_code {
        400 => HttpResponse::BadRequest().json(body),
        422 => HttpResponse::UnprocessableEntity().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, http::StatusCode};

    #[actix_web::test]
    async fn test_error_status_codes() {
        let malformed = error_response(&MatchingError::malformed("bad list"));
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

        let large = error_response(&MatchingError::InstanceTooLarge { size: 9, limit: 8 });
        assert_eq!(large.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let stuck = error_response(&MatchingError::NonTermination { rounds: 4, limit: 4 });
        assert_eq!(stuck.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(malformed.into_body()).await.unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.status_code, 400);
        assert!(parsed.message.contains("bad list"));
    }

    #[test]
    fn test_solve_instance_reports_stability() {
        let instance = seeded_instance(6, 11);
        let response = solve_instance(&instance, true).unwrap();

        assert!(response.stable);
        assert_eq!(response.pairs.len(), 6);
        assert_eq!(response.trace.map(|t| t.len()), Some(response.rounds));
    }

    #[test]
    fn test_check_size() {
        let instance = seeded_instance(5, 1);
        assert!(check_size(&instance, 5).is_ok());
        assert!(check_size(&instance, 4).is_err());
    }
}
