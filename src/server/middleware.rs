use warp::{filters::reply::WithHeader, Filter};

/// Largest request body the suggest endpoint reads.
pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Adds `Access-Control-Allow-Origin: *` to every response. Preflight requests
/// are answered by the explicit `OPTIONS` route so its headers reach the client.
pub fn allow_any_origin() -> WithHeader {
    warp::reply::with::header("Access-Control-Allow-Origin", "*")
}

pub fn body_limit() -> impl Filter<Extract = (), Error = warp::Rejection> + Copy {
    warp::body::content_length_limit(MAX_BODY_BYTES)
}
