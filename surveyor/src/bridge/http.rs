use crate::generator::profile::{build_survey, GeneratorConfig};
use crate::session::{CameraUpdate, SurveySession};
use crate::workflow::config::SurveyConfig;
use anyhow::Context;
use log::{info, warn};
use remcore::CameraRecord;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread;
use tokio::runtime::Builder;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

pub type SharedSession = Arc<RwLock<SurveySession>>;

pub fn bridge_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CalculateRequest {
    movement_rate: Option<f64>,
}

fn read_session(state: &SharedSession) -> RwLockReadGuard<'_, SurveySession> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_session(state: &SharedSession) -> RwLockWriteGuard<'_, SurveySession> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

fn with_session(
    state: SharedSession,
) -> impl Filter<Extract = (SharedSession,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_reply<T: Serialize>(value: &T, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(value), status)
}

fn error_reply(message: String, status: StatusCode) -> WithStatus<Json> {
    json_reply(&json!({ "status": "error", "message": message }), status)
}

fn ok_reply() -> WithStatus<Json> {
    json_reply(&json!({ "status": "ok" }), StatusCode::OK)
}

/// HTTP surface over a shared [`SurveySession`].
///
/// | Route                   | Effect                                   |
/// |-------------------------|------------------------------------------|
/// | `GET /cameras`          | list cameras                             |
/// | `POST /cameras`         | add one camera                           |
/// | `PATCH /cameras/{id}`   | partial update of one camera             |
/// | `DELETE /cameras/{id}`  | remove one camera                        |
/// | `POST /survey`          | replace cameras and movement rate        |
/// | `POST /generate`        | replace cameras with a synthetic survey  |
/// | `POST /calculate`       | optionally set the rate, then calculate  |
/// | `GET /results`          | latest calculation                       |
/// | `POST /reset`           | clear the session                        |
pub fn routes(
    state: SharedSession,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list_cameras = warp::path!("cameras")
        .and(warp::get())
        .and(with_session(state.clone()))
        .map(|state: SharedSession| {
            let session = read_session(&state);
            json_reply(&session.cameras(), StatusCode::OK)
        });

    let add_camera = warp::path!("cameras")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_session(state.clone()))
        .map(|camera: CameraRecord, state: SharedSession| {
            let mut session = write_session(&state);
            let outcome = session
                .add_camera(camera)
                .map(|added| json_reply(added, StatusCode::CREATED));
            outcome.unwrap_or_else(|err| error_reply(format!("{:#}", err), StatusCode::BAD_REQUEST))
        });

    let update_camera = warp::path!("cameras" / String)
        .and(warp::patch())
        .and(warp::body::json())
        .and(with_session(state.clone()))
        .map(|id: String, update: CameraUpdate, state: SharedSession| {
            if write_session(&state).update_camera(&id, &update) {
                ok_reply()
            } else {
                error_reply(format!("camera {} not found", id), StatusCode::NOT_FOUND)
            }
        });

    let delete_camera = warp::path!("cameras" / String)
        .and(warp::delete())
        .and(with_session(state.clone()))
        .map(|id: String, state: SharedSession| {
            if write_session(&state).delete_camera(&id) {
                ok_reply()
            } else {
                error_reply(format!("camera {} not found", id), StatusCode::NOT_FOUND)
            }
        });

    let load_survey = warp::path!("survey")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_session(state.clone()))
        .map(|config: SurveyConfig, state: SharedSession| {
            let mut session = write_session(&state);
            session.load_cameras(config.cameras);
            session.set_movement_rate(config.movement_rate);
            let count = session.cameras().len();
            let movement_rate = session.movement_rate();
            info!("survey loaded over HTTP: {} cameras", count);
            json_reply(
                &json!({ "status": "ok", "cameras": count, "movementRate": movement_rate }),
                StatusCode::OK,
            )
        });

    let generate = warp::path!("generate")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_session(state.clone()))
        .map(|config: GeneratorConfig, state: SharedSession| match build_survey(&config) {
            Ok(cameras) => {
                let mut session = write_session(&state);
                session.load_cameras(cameras);
                let count = session.cameras().len();
                info!("synthetic survey generated: {} cameras, seed {}", count, config.seed);
                json_reply(&json!({ "status": "ok", "cameras": count }), StatusCode::OK)
            }
            Err(err) => error_reply(format!("{:#}", err), StatusCode::BAD_REQUEST),
        });

    let calculate = warp::path!("calculate")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_session(state.clone()))
        .map(|request: CalculateRequest, state: SharedSession| {
            let mut session = write_session(&state);
            if request.movement_rate.is_some() {
                session.set_movement_rate(request.movement_rate);
            }
            let outcome = session
                .calculate()
                .map(|result| json_reply(result, StatusCode::OK));
            outcome.unwrap_or_else(|err| {
                warn!("calculate request rejected: {:#}", err);
                error_reply(format!("{:#}", err), StatusCode::BAD_REQUEST)
            })
        });

    let results = warp::path!("results")
        .and(warp::get())
        .and(with_session(state.clone()))
        .map(|state: SharedSession| {
            let session = read_session(&state);
            match session.results() {
                Some(result) => json_reply(result, StatusCode::OK),
                None => error_reply("no results calculated yet".into(), StatusCode::NOT_FOUND),
            }
        });

    let reset = warp::path!("reset")
        .and(warp::post())
        .and(with_session(state))
        .map(|state: SharedSession| {
            write_session(&state).reset();
            ok_reply()
        });

    list_cameras
        .or(add_camera)
        .or(update_camera)
        .or(delete_camera)
        .or(load_survey)
        .or(generate)
        .or(calculate)
        .or(results)
        .or(reset)
}

/// Hosts the survey routes on a background thread.
pub struct SurveyBridge {
    state: SharedSession,
}

impl SurveyBridge {
    pub fn new(session: SurveySession) -> Self {
        Self {
            state: Arc::new(RwLock::new(session)),
        }
    }

    pub fn state(&self) -> SharedSession {
        self.state.clone()
    }

    /// Binds `addr` before handing the server to its thread, so a port
    /// already in use is reported here. Returns the bound address.
    pub fn spawn(&self, addr: SocketAddr) -> anyhow::Result<SocketAddr> {
        let routes = routes(self.state());
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for survey bridge")?;
        let (bound, server) = {
            let _guard = runtime.enter();
            warp::serve(routes)
                .try_bind_ephemeral(addr)
                .with_context(|| format!("binding survey bridge to {}", addr))?
        };
        thread::Builder::new()
            .name("survey-bridge".into())
            .spawn(move || runtime.block_on(server))
            .context("spawning survey bridge thread")?;
        info!("survey bridge listening on http://{}", bound);
        Ok(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remcore::CalculationResultSet;

    fn survey_body() -> serde_json::Value {
        json!({
            "movementRate": 0.5,
            "cameras": [
                { "id": "a", "trapNights": 30, "totalDeer": 45, "detectionDistance": 15,
                  "detectionAngleLeft": 30, "detectionAngleRight": 30 },
                { "trapNights": 20, "totalDeer": 10, "detectionDistance": 12,
                  "detectionAngleLeft": 25, "detectionAngleRight": 35 }
            ]
        })
    }

    #[tokio::test]
    async fn calculate_route_returns_and_stores_results() {
        let bridge = SurveyBridge::new(SurveySession::new());
        let filter = routes(bridge.state());

        let resp = warp::test::request()
            .method("POST")
            .path("/survey")
            .json(&survey_body())
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = warp::test::request()
            .method("POST")
            .path("/calculate")
            .json(&json!({}))
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let result: CalculationResultSet = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(result.per_camera.len(), 2);
        assert_eq!(result.per_camera[1].camera_id, "camera-1");
        assert_eq!(result.total_trap_nights, 50.0);

        let resp = warp::test::request()
            .method("GET")
            .path("/results")
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let stored = read_session(&bridge.state()).results().cloned().unwrap();
        assert_eq!(stored, result);
    }

    #[tokio::test]
    async fn calculate_route_rejects_missing_rate() {
        let mut session = SurveySession::new();
        session.load_cameras(vec![CameraRecord::new("a", 30.0, 45.0, 15.0, 30.0, 30.0)]);
        let filter = routes(Arc::new(RwLock::new(session)));

        let resp = warp::test::request()
            .method("POST")
            .path("/calculate")
            .json(&json!({}))
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = warp::test::request()
            .method("POST")
            .path("/calculate")
            .json(&json!({ "movementRate": -2.0 }))
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn camera_routes_edit_the_session() {
        let bridge = SurveyBridge::new(SurveySession::new());
        let filter = routes(bridge.state());

        let resp = warp::test::request()
            .method("POST")
            .path("/cameras")
            .json(&json!({ "trapNights": 10, "totalDeer": 5, "detectionDistance": 1 }))
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = warp::test::request()
            .method("PATCH")
            .path("/cameras/camera-1")
            .json(&json!({ "totalDeer": 8 }))
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(read_session(&bridge.state()).cameras()[0].total_deer, 8.0);

        let resp = warp::test::request()
            .method("DELETE")
            .path("/cameras/missing")
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = warp::test::request()
            .method("DELETE")
            .path("/cameras/camera-1")
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(read_session(&bridge.state()).cameras().is_empty());
    }

    #[tokio::test]
    async fn generate_route_loads_a_synthetic_survey() {
        let bridge = SurveyBridge::new(SurveySession::new());
        let filter = routes(bridge.state());

        let resp = warp::test::request()
            .method("POST")
            .path("/generate")
            .json(&json!({ "cameras": 4, "seed": 11 }))
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(read_session(&bridge.state()).cameras().len(), 4);

        let resp = warp::test::request()
            .method("POST")
            .path("/generate")
            .json(&json!({ "cameras": 2, "maxAngle": 0.0 }))
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn spawn_reports_a_port_already_in_use() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let taken = listener.local_addr().unwrap();

        let bridge = SurveyBridge::new(SurveySession::new());
        let err = bridge.spawn(taken).unwrap_err();
        assert!(format!("{:#}", err).contains("binding survey bridge"));
    }

    #[test]
    fn spawn_returns_the_bound_address() {
        let bridge = SurveyBridge::new(SurveySession::new());
        let bound = bridge.spawn(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
        assert_ne!(bound.port(), 0);
    }

    #[tokio::test]
    async fn results_route_is_empty_until_calculated() {
        let filter = routes(Arc::new(RwLock::new(SurveySession::new())));
        let resp = warp::test::request()
            .method("GET")
            .path("/results")
            .reply(&filter)
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
