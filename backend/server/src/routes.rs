use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

use crate::{
    catalog::{Industry, SalesMethod},
    display::{BrandCard, KocCard},
    error::AppError,
    models::{Brand, Entity, Koc},
    notify::{Notice, NoticeLog, Traced},
    register::{RegisterTab, Registration, SubmitOutcome},
    schema::{BrandForm, Form, KocForm},
    search::{CategoryFilter, Listed, Listing},
    state::State as AppState,
};

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ListingQuery {
    pub search: String,
    pub industry: String,
}

#[derive(Deserialize, Default)]
pub struct RegisterQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Serialize)]
pub struct ListingPage<C> {
    pub total: usize,
    pub items: Vec<C>,
    pub notices: Vec<Notice>,
}

#[derive(Serialize)]
pub struct RegisterPage {
    pub tab: RegisterTab,
    pub industries: Vec<&'static str>,
    pub sales_methods: Vec<&'static str>,
    pub defaults: Value,
}

pub async fn home_handler() -> impl IntoResponse {
    Json(json!({
        "title": "Kết nối KOC và Brand",
        "tagline": "Nền tảng kết nối chuyên nghiệp giữa Key Opinion Consumer (KOC) và các thương hiệu, tạo cơ hội hợp tác kinh doanh bền vững.",
        "links": {
            "kocs": "/kocs",
            "brands": "/brands",
            "register_koc": "/register?type=koc",
            "register_brand": "/register?type=brand",
        },
    }))
}

pub async fn kocs_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> Result<Response, AppError> {
    listing_page::<Koc, KocCard>(&state, query).await
}

pub async fn brands_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> Result<Response, AppError> {
    listing_page::<Brand, BrandCard>(&state, query).await
}

async fn listing_page<E, C>(state: &AppState, query: ListingQuery) -> Result<Response, AppError>
where
    E: Entity,
    E::Row: Listed,
    C: for<'a> From<&'a E::Row> + Serialize,
{
    let category: CategoryFilter = query
        .industry
        .parse()
        .map_err(|e| AppError::BadRequest(format!("{e}")))?;

    let log = NoticeLog::new();
    let mut listing = Listing::<E>::new();
    let loaded = listing.load(&state.store, &Traced::new(&log)).await;

    listing.set_search(query.search);
    listing.set_category(category);

    let items: Vec<C> = listing.visible().into_iter().map(C::from).collect();
    debug!("{} of {} {} rows visible", items.len(), listing.records().len(), E::TABLE);

    let status = if loaded {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };

    let page = ListingPage {
        total: items.len(),
        items,
        notices: log.take(),
    };

    Ok((status, Json(page)).into_response())
}

pub async fn register_page_handler(Query(query): Query<RegisterQuery>) -> Result<Response, AppError> {
    let tab = RegisterTab::from_query(query.kind.as_deref());

    let defaults = match tab {
        RegisterTab::Koc => serde_json::to_value(KocForm::default()),
        RegisterTab::Brand => serde_json::to_value(BrandForm::default()),
    }
    .map_err(|e| AppError::InternalError(Box::new(e)))?;

    let page = RegisterPage {
        tab,
        industries: Industry::ALL.iter().map(|industry| industry.label()).collect(),
        sales_methods: SalesMethod::ALL.iter().map(|method| method.label()).collect(),
        defaults,
    };

    Ok(Json(page).into_response())
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegisterQuery>,
    Json(payload): Json<Value>,
) -> Result<Response, AppError> {
    match RegisterTab::from_query(query.kind.as_deref()) {
        RegisterTab::Koc => submit(state, parse_form::<KocForm>(payload)?).await,
        RegisterTab::Brand => submit(state, parse_form::<BrandForm>(payload)?).await,
    }
}

fn parse_form<F>(payload: Value) -> Result<F, AppError>
where
    F: Form + for<'de> Deserialize<'de>,
{
    serde_json::from_value(payload).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// The insert runs on its own task so a client that hangs up does not cancel it.
async fn submit<F: Form + 'static>(state: Arc<AppState>, form: F) -> Result<Response, AppError> {
    let task = tokio::spawn(async move {
        let log = NoticeLog::new();
        let mut registration = Registration::with_draft(form);
        let outcome = registration.submit(&state.store, &Traced::new(&log)).await;

        (outcome, log.take())
    });

    let (outcome, notices) = task
        .await
        .map_err(|e| AppError::InternalError(Box::new(e)))?;

    let response = match outcome {
        SubmitOutcome::Created(id) => (
            StatusCode::CREATED,
            Json(json!({ "id": id, "notices": notices })),
        ),
        SubmitOutcome::Invalid(errors) => return Err(AppError::Validation(errors)),
        SubmitOutcome::Failed(_) => (StatusCode::BAD_GATEWAY, Json(json!({ "notices": notices }))),
        SubmitOutcome::Busy => (StatusCode::CONFLICT, Json(json!({ "notices": notices }))),
    };

    Ok(response.into_response())
}

/// No message is sent anywhere; the admin flow does not exist yet.
pub async fn contact_handler(Path(id): Path<Uuid>) -> impl IntoResponse {
    debug!("Contact requested for {id}");

    Json(Notice::contact_admin())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::{
        app,
        config::Config,
        database::{MemoryStore, Store},
        state::State,
    };

    fn test_state() -> Arc<State> {
        let config = Config {
            port: 0,
            store_url: None,
            store_key: None,
        };

        State::with_store(config, Store::Memory(MemoryStore::new()))
    }

    fn memory(state: &State) -> &MemoryStore {
        match &state.store {
            Store::Memory(store) => store,
            Store::Rest(_) => panic!("test state uses the memory store"),
        }
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn koc_payload() -> Value {
        json!({
            "full_name": "Nguyễn Văn A",
            "phone": "0912345678",
            "email": "a@example.com",
            "channel_link": "https://tiktok.com/@vana",
            "channel_id": "@vana",
            "industries": ["Thời trang", "Làm đẹp"],
            "sales_method": "Livestream",
            "follower_count": 1500000,
            "shipping_address": "12 Lý Thường Kiệt, Hoàn Kiếm, Hà Nội",
            "short_description": "Chuyên review mỹ phẩm"
        })
    }

    #[tokio::test]
    async fn test_home() {
        let (status, body) = call(app(test_state()), get("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["links"]["register_brand"], "/register?type=brand");
    }

    #[tokio::test]
    async fn test_register_koc_then_list() {
        let state = test_state();

        let (status, body) = call(app(state.clone()), post("/register?type=koc", koc_payload())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["notices"][0]["kind"], "success");
        assert!(body["id"].is_string());

        let (status, body) = call(app(state.clone()), get("/kocs?industry=L%C3%A0m%20%C4%91%E1%BA%B9p")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["followers"], "1.5M");
        assert_eq!(body["items"][0]["sales_method"], "Livestream");

        let (_, body) = call(app(state.clone()), get("/kocs?industry=%C4%90i%E1%BB%87n%20t%E1%BB%AD")).await;
        assert_eq!(body["total"], 0);

        let (_, body) = call(app(state), get("/kocs?search=M%E1%BB%B8%20PH%E1%BA%A8M")).await;
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_invalid_registration_is_422() {
        let state = test_state();
        let mut payload = koc_payload();
        payload["industries"] = json!(["Thời trang", "Làm đẹp", "Điện tử", "Gia dụng"]);

        let (status, body) = call(app(state.clone()), post("/register?type=koc", payload)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["industries"], "Chọn tối đa 3 ngành hàng");
        assert_eq!(memory(&state).insert_count(), 0);
    }

    #[tokio::test]
    async fn test_register_brand_store_failure() {
        let state = test_state();
        memory(&state).fail_with("duplicate key value");

        let payload = json!({
            "brand_name": "Cocoon",
            "contact_person": "Trần Thị B",
            "phone": "0987654321",
            "email": "b@cocoon.vn",
            "industry": "Làm đẹp",
            "expected_budget": "15000000"
        });
        let (status, body) = call(app(state), post("/register?type=brand", payload)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["notices"][0]["title"], "Lỗi đăng ký");
        assert_eq!(body["notices"][0]["message"], "duplicate key value");
    }

    #[tokio::test]
    async fn test_brand_listing_formats_budget() {
        let state = test_state();
        let payload = json!({
            "brand_name": "Cocoon",
            "contact_person": "Trần Thị B",
            "phone": "0987654321",
            "email": "b@cocoon.vn",
            "industry": "Làm đẹp",
            "expected_budget": 15000000
        });
        call(app(state.clone()), post("/register?type=brand", payload)).await;

        let (status, body) = call(app(state), get("/brands?industry=all")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["budget"], "15.0M VNĐ");
    }

    #[tokio::test]
    async fn test_listing_failure_is_empty() {
        let state = test_state();
        memory(&state).fail_with("timeout");

        let (status, body) = call(app(state), get("/brands")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["total"], 0);
        assert_eq!(body["notices"][0]["message"], "Không thể tải danh sách Brand");
    }

    #[tokio::test]
    async fn test_unknown_category_is_400() {
        let (status, _) = call(app(test_state()), get("/kocs?industry=Cars")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_page_tab() {
        let (_, body) = call(app(test_state()), get("/register?type=brand")).await;
        assert_eq!(body["tab"], "brand");
        assert_eq!(body["defaults"]["industry"], "Thời trang");
        assert_eq!(body["industries"].as_array().map(Vec::len), Some(14));

        let (_, body) = call(app(test_state()), get("/register?type=other")).await;
        assert_eq!(body["tab"], "koc");
        assert_eq!(body["defaults"]["job_completion_days"], "3");
    }

    #[tokio::test]
    async fn test_contact_is_a_stub() {
        let state = test_state();
        let uri = format!("/kocs/{}/contact", uuid::Uuid::new_v4());

        let (status, body) = call(app(state.clone()), post(&uri, Value::Null)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Liên hệ Admin");
        assert_eq!(memory(&state).insert_count(), 0);
        assert_eq!(memory(&state).select_count(), 0);
    }
}
