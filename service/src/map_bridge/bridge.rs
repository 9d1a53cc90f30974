use crate::map_bridge::model::{OperatorList, ServiceStatus};
use crate::workflow::runner::Runner;
use anyhow::Context;
use log::{error, info};
use signalcore::survey::FilterParams;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

#[derive(Debug)]
struct BlockingTaskFailed;

impl warp::reject::Reject for BlockingTaskFailed {}

/// Runs `work` on the blocking pool, since it reads and parses the source file.
async fn off_executor<T, F>(work: F) -> Result<T, Rejection>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|err| {
        error!("blocking request task failed: {err}");
        warp::reject::custom(BlockingTaskFailed)
    })
}

/// Routes of the map endpoint.
///
/// `GET /map?tech=&operator=&psc_pci=` answers with the map view, `GET /operators`
/// with the operator filter options and `GET /status` with runner metrics.
pub fn routes(
    runner: Arc<Runner>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let runner_filter = warp::any().map(move || runner.clone());

    let map_route = warp::path("map")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<FilterParams>())
        .and(runner_filter.clone())
        .and_then(|params: FilterParams, runner: Arc<Runner>| async move {
            let view = off_executor(move || runner.execute(&params)).await?;
            Ok::<_, Rejection>(warp::reply::json(&view))
        });

    let operators_route = warp::path("operators")
        .and(warp::path::end())
        .and(warp::get())
        .and(runner_filter.clone())
        .and_then(|runner: Arc<Runner>| async move {
            let operators = off_executor(move || runner.operators()).await?;
            Ok::<_, Rejection>(warp::reply::json(&OperatorList { operators }))
        });

    let status_route = warp::path("status")
        .and(warp::path::end())
        .and(warp::get())
        .and(runner_filter)
        .map(|runner: Arc<Runner>| warp::reply::json(&ServiceStatus::from_runner(&runner)));

    map_route.or(operators_route).or(status_route)
}

/// Serves the routes on `addr` until `shutdown` resolves.
pub async fn serve<F>(runner: Arc<Runner>, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (bound, server) = warp::serve(routes(runner))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .with_context(|| format!("binding map bridge to {addr}"))?;
    info!("map bridge listening on http://{}", bound);
    server.await;
    info!("map bridge stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::ServiceConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use warp::http::StatusCode;

    fn runner_for(contents: &str) -> (Arc<Runner>, tempfile::TempPath) {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(contents.as_bytes()).unwrap();
        let path = temp.into_temp_path();
        let runner = Runner::new(ServiceConfig::default().with_source(path.to_path_buf()));
        (Arc::new(runner), path)
    }

    const SURVEY: &str = "lat,long,rssi,tech,psc_pci,net_op_name\n\
        457555,212255,-80,LTE,301,Orange\n\
        457655,212355,-95,GSM,17,Vodafone\n";

    #[tokio::test]
    async fn map_route_applies_query_filters() {
        let (runner, _path) = runner_for(SURVEY);
        let api = routes(runner);
        let resp = warp::test::request()
            .method("GET")
            .path("/map?tech=2G")
            .reply(&api)
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["points"].as_array().unwrap().len(), 1);
        assert_eq!(body["points"][0]["operator"], "Vodafone");
        assert_eq!(body["filters"]["tech"], "2G");
    }

    #[tokio::test]
    async fn map_route_defaults_to_all() {
        let (runner, _path) = runner_for(SURVEY);
        let api = routes(runner);
        let resp = warp::test::request().path("/map").reply(&api).await;
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["points"].as_array().unwrap().len(), 2);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn operators_and_status_routes() {
        let (runner, _path) = runner_for(SURVEY);
        let api = routes(runner);

        let resp = warp::test::request().path("/operators").reply(&api).await;
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["operators"], serde_json::json!(["Orange", "Vodafone"]));

        let _ = warp::test::request().path("/map").reply(&api).await;
        let resp = warp::test::request().path("/status").reply(&api).await;
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["metrics"]["requests"], 1);
        assert_eq!(body["cached"], false);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_map_requests_are_served() {
        let (runner, _path) = runner_for(SURVEY);
        let api = routes(runner.clone());
        let (first, second) = tokio::join!(
            warp::test::request().path("/map?tech=4G").reply(&api),
            warp::test::request().path("/operators").reply(&api),
        );
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(first.body()).unwrap();
        assert_eq!(body["points"][0]["operator"], "Orange");
        assert_eq!(runner.metrics().requests, 1);
    }

    #[tokio::test]
    async fn failed_blocking_task_becomes_rejection() {
        assert_eq!(off_executor(|| 7).await.unwrap(), 7);
        let rejected = off_executor(|| -> u32 { panic!("source read failed") }).await;
        assert!(rejected.unwrap_err().find::<BlockingTaskFailed>().is_some());
    }

    #[tokio::test]
    async fn unknown_path_is_rejected() {
        let (runner, _path) = runner_for(SURVEY);
        let api = routes(runner);
        let resp = warp::test::request().path("/tiles").reply(&api).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
