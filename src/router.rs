use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors},
    routes,
};

/// 组装应用路由。
/// 公开路由匿名只读，受保护路由经过认证中间件
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/user/signup", post(routes::user::signup))
        .route("/user/signin", post(routes::user::signin))
        .route("/blog/bulk", get(routes::blog::list_posts))
        .route("/blog/{id}", get(routes::blog::get_post));

    let protected_routes = Router::new()
        .route("/blog", post(routes::blog::publish_post))
        .route("/blog/vote", put(routes::blog::toggle_vote))
        // 应用认证中间件
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest(
            "/api/v1",
            Router::new().merge(public_routes).merge(protected_routes),
        )
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
