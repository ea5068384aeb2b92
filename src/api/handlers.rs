//! View Handlers
//!
//! Setiap handler = satu halaman: ambil data lewat service, lalu
//! `ViewContext::respond` mengubah hasil + notifikasi + navigasi jadi respons.

use axum::{
    extract::{Json, Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::context::{AppState, ViewContext};
use super::types::*;
use crate::core::mutation::DeleteMessages;
use crate::core::notify::{Notification, Notifier};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{ComplaintCategory, FinancePayload, IdmCategory, IdmPayload, RecordId};
use crate::services::dashboard::DashboardService;
use crate::services::fasilitas::{FacilityForm, FacilityService};
use crate::services::idm::IdmService;
use crate::services::keuangan::{current_year, FinanceKind, FinanceService, PdfDocument};
use crate::services::pengaduan::{ComplaintCounts, ComplaintForm, ComplaintService, MediaFile};
use crate::services::potensi::{PotensiFilter, PotensiService, PotensiView};
use crate::services::user::{AccountService, Credentials};
use crate::utils::constants::MEDIA_FIELD;

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        upstream: state.config.api.base_url.clone(),
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}

// ============================================
// Public pages
// ============================================

pub async fn public_facilities(ctx: ViewContext) -> Response {
    let state = FacilityService::new(&ctx.client).load_map().await;
    let result = from_load(state).map(|map| map.view());
    ctx.respond(result)
}

pub async fn public_potentials(ctx: ViewContext, Query(query): Query<PotensiQuery>) -> Response {
    let service = PotensiService::new(&ctx.client);
    let (sites, boundary) = tokio::join!(service.load_sites(), service.load_boundary());

    let filter = PotensiFilter::from_params(query.kategori.as_deref(), query.q.as_deref());
    let result = from_load(sites).map(|(sites, demo)| PotensiView::build(&sites, &filter, boundary, demo));
    ctx.respond(result)
}

pub async fn apbdesa_pdf(ctx: ViewContext, Path(year): Path<i32>) -> Response {
    match FinanceService::download_pdf(&ctx.client, year, current_year(), ctx.notifier()).await {
        Ok(document) => pdf_response(document),
        Err(err) => ctx.respond::<()>(Err(view_error(&err))),
    }
}

fn pdf_response(document: PdfDocument) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", document.file_name);
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response()
}

pub async fn submit_complaint(ctx: ViewContext, multipart: Multipart) -> Response {
    let mut form = match read_complaint(multipart).await {
        Ok(form) => form,
        Err(err) => return ctx.respond::<Submitted>(Err(view_error(&err))),
    };

    let result = ComplaintService::new(&ctx.client)
        .submit(&mut form, ctx.notifier())
        .await
        .map(|_| Submitted { submitted: true })
        .map_err(|err| view_error(&err));
    ctx.respond(result)
}

/// Multipart body → complaint form (`media[]` parts become attachments)
async fn read_complaint(mut multipart: Multipart) -> AppResult<ComplaintForm> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        AppError::validation(format!("Form pengaduan tidak valid: {}", e))
    };

    let mut form = ComplaintForm::new();
    let mut media = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == MEDIA_FIELD || name == "media" {
            let file_name = field.file_name().unwrap_or("lampiran").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(invalid)?;
            let file = MediaFile::new(file_name, bytes.to_vec());
            media.push(match content_type {
                Some(ct) => file.with_content_type(ct),
                None => file,
            });
            continue;
        }

        let value = field.text().await.map_err(invalid)?;
        match name.as_str() {
            "nama" => form.nama = value,
            "nomor_telepon" => form.nomor_telepon = value,
            "kategori" => form.kategori = ComplaintCategory::parse(&value),
            "detail_pengaduan" => form.detail_pengaduan = value,
            other => debug!(field = other, "Ignoring unknown complaint field"),
        }
    }

    if !media.is_empty() {
        form.add_media(media)?;
    }
    Ok(form)
}

// ============================================
// Session
// ============================================

pub async fn login(ctx: ViewContext, Json(credentials): Json<Credentials>) -> Response {
    let result = AccountService::new(&ctx.client)
        .login(&credentials)
        .await
        .map(|_| LoginData { logged_in: true })
        .map_err(|err| view_error(&err));
    ctx.respond(result)
}

pub async fn logout(ctx: ViewContext) -> Response {
    let result = AccountService::new(&ctx.client)
        .logout()
        .map(|_| LoginData { logged_in: false })
        .map_err(|err| view_error(&err));
    ctx.respond(result)
}

pub async fn current_user(ctx: ViewContext) -> Response {
    let state = AccountService::new(&ctx.client).current_user().await;
    ctx.respond(from_load(state))
}

// ============================================
// Admin: dashboard
// ============================================

pub async fn admin_dashboard(ctx: ViewContext) -> Response {
    let view = DashboardService::new(&ctx.client).load().await;
    ctx.respond(Ok(view))
}

// ============================================
// Admin: pendapatan / belanja
// ============================================

pub async fn finance_detail(kind: FinanceKind, ctx: ViewContext, Query(query): Query<TableQuery>) -> Response {
    let state = FinanceService::new(&ctx.client, kind).load().await;
    let result = from_load(state).map(|mut ledger| {
        if let Some(year) = query.tahun {
            ledger.select_year(year);
        }
        if let (Some(kategori), Some(page)) = (query.kategori.as_deref(), query.page) {
            ledger.set_page(kategori, page);
        }
        ledger.view(current_year())
    });
    ctx.respond(result)
}

pub async fn finance_create(kind: FinanceKind, ctx: ViewContext, Json(payload): Json<FinancePayload>) -> Response {
    let result = FinanceService::new(&ctx.client, kind)
        .create(&payload, ctx.notifier())
        .await
        .map(|_| Submitted { submitted: true })
        .map_err(|err| view_error(&err));
    ctx.respond(result)
}

pub async fn finance_delete(kind: FinanceKind, ctx: ViewContext, Path(id): Path<String>) -> Response {
    let id = RecordId::from(id.as_str());
    let result = FinanceService::new(&ctx.client, kind).delete_remote(&id).await;
    finish_delete(ctx, id, result, kind.delete_messages())
}

/// Confirmed delete outcome: notification + deleted id or error
fn finish_delete(ctx: ViewContext, id: RecordId, result: AppResult<()>, messages: DeleteMessages) -> Response {
    messages.report(&id, &result, ctx.notifier());
    let result = result
        .map(|_| Deleted { id: id.to_string() })
        .map_err(|err| view_error(&err));
    ctx.respond(result)
}

// ============================================
// Admin: IDM
// ============================================

pub async fn admin_idm(ctx: ViewContext, Query(query): Query<TableQuery>) -> Response {
    let state = IdmService::new(&ctx.client).load().await;
    let result = from_load(state).map(|mut board| {
        if let Some(year) = query.tahun {
            board.select_year(year);
        }
        let category = query.kategori.as_deref().and_then(IdmCategory::parse);
        if let (Some(category), Some(page)) = (category, query.page) {
            board.set_page(category, page);
        }
        board.view()
    });
    ctx.respond(result)
}

pub async fn idm_create(ctx: ViewContext, Json(payload): Json<IdmPayload>) -> Response {
    let result = IdmService::new(&ctx.client)
        .create(&payload, ctx.notifier())
        .await
        .map(|_| Submitted { submitted: true })
        .map_err(|err| view_error(&err));
    ctx.respond(result)
}

pub async fn idm_delete(ctx: ViewContext, Path(id): Path<String>) -> Response {
    let id = RecordId::from(id.as_str());
    let result = IdmService::new(&ctx.client).delete(&id).await;
    finish_delete(ctx, id, result, IdmService::delete_messages())
}

// ============================================
// Admin: pengaduan
// ============================================

pub async fn admin_complaints(ctx: ViewContext) -> Response {
    let state = ComplaintService::new(&ctx.client).list().await;
    let result = from_load(state).map(|items| ComplaintListData {
        counts: ComplaintCounts::from_items(&items),
        items,
    });
    ctx.respond(result)
}

pub async fn complaint_status(
    ctx: ViewContext,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Response {
    let id = RecordId::from(id.as_str());
    let result = match ComplaintService::new(&ctx.client)
        .update_status(&id, &request.status)
        .await
    {
        Ok(()) => {
            ctx.notifier()
                .notify(Notification::success("Status pengaduan berhasil diperbarui"));
            Ok(Submitted { submitted: true })
        }
        Err(err) => {
            ctx.notifier().notify(
                Notification::error("Gagal memperbarui status pengaduan").with_description(err.message.clone()),
            );
            Err(view_error(&err))
        }
    };
    ctx.respond(result)
}

pub async fn complaint_delete(ctx: ViewContext, Path(id): Path<String>) -> Response {
    let id = RecordId::from(id.as_str());
    let result = ComplaintService::new(&ctx.client).delete(&id).await;
    finish_delete(ctx, id, result, DeleteMessages::for_resource("pengaduan"))
}

// ============================================
// Admin: fasilitas
// ============================================

pub async fn admin_facilities(ctx: ViewContext) -> Response {
    let state = FacilityService::new(&ctx.client).load_map().await;
    ctx.respond(from_load(state).map(|map| map.view()))
}

pub async fn facility_create(ctx: ViewContext, Json(form): Json<FacilityForm>) -> Response {
    let result = FacilityService::new(&ctx.client)
        .create(&form, ctx.notifier())
        .await
        .map(|_| Submitted { submitted: true })
        .map_err(|err| view_error(&err));
    ctx.respond(result)
}

pub async fn facility_edit(ctx: ViewContext, Path(id): Path<String>) -> Response {
    let service = FacilityService::new(&ctx.client);
    let (form, articles) = tokio::join!(
        service.load_for_edit(&id, ctx.notifier()),
        service.article_options(ctx.notifier())
    );
    let result = match form {
        Ok(Some(form)) => Ok(FacilityEditData { form, articles }),
        Ok(None) => Err(view_error(&AppError::not_found())),
        Err(err) => Err(view_error(&err)),
    };
    ctx.respond(result)
}

pub async fn facility_update(ctx: ViewContext, Path(id): Path<String>, Json(form): Json<FacilityForm>) -> Response {
    let result = FacilityService::new(&ctx.client)
        .update(&id, &form, ctx.notifier())
        .await
        .map(|_| Submitted { submitted: true })
        .map_err(|err| view_error(&err));
    ctx.respond(result)
}

pub async fn facility_delete(ctx: ViewContext, Path(id): Path<String>) -> Response {
    let id = RecordId::from(id.as_str());
    let result = FacilityService::new(&ctx.client).delete(&id).await;
    finish_delete(ctx, id, result, DeleteMessages::for_resource("fasilitas"))
}
