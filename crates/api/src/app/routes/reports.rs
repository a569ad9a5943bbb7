//! CSV import and downloadable exports.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::{StatusCode, header},
    response::IntoResponse,
};

use stockroom_auth::permissions;
use stockroom_infra::{ReportFile, ReportFormat};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{CompanyContext, PrincipalContext};

fn parse_format(raw: &str) -> Option<ReportFormat> {
    match raw.to_lowercase().as_str() {
        "csv" => Some(ReportFormat::Csv),
        "doc" | "word" => Some(ReportFormat::Doc),
        "pdf" => Some(ReportFormat::Pdf),
        "xlsx" | "excel" => Some(ReportFormat::Xlsx),
        _ => None,
    }
}

fn attachment(file: ReportFile) -> axum::response::Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.bytes,
    )
        .into_response()
}

/// Body is the raw CSV text.
pub async fn import_csv(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ScopeQuery>,
    body: String,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::IMPORT) {
        return res;
    }
    let scope = match common::scope(&services, &principal, &query).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    match services
        .inventory
        .import_csv(principal.principal(), scope, &body)
        .await
    {
        Ok(report) => Json(serde_json::json!({
            "success": report.success(),
            "imported": report.imported,
            "errors": report.errors,
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Re-importable CSV (`Código,Nombre,Cantidad,Precio`).
pub async fn export_csv(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ScopeQuery>,
) -> axum::response::Response {
    download(services, company, principal, query, ReportFormat::SimpleCsv).await
}

pub async fn download_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(format): Path<String>,
    Query(query): Query<dto::ScopeQuery>,
) -> axum::response::Response {
    let Some(format) = parse_format(&format) else {
        return errors::json_error(
            StatusCode::NOT_FOUND,
            "unknown_report",
            "report must be one of: csv, doc, pdf, xlsx",
        );
    };
    download(services, company, principal, query, format).await
}

async fn download(
    services: Arc<AppServices>,
    company: CompanyContext,
    principal: PrincipalContext,
    query: dto::ScopeQuery,
    format: ReportFormat,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::REPORTS_READ) {
        return res;
    }
    let scope = match common::scope(&services, &principal, &query).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    match services
        .inventory
        .render_report(principal.principal(), scope, format)
        .await
    {
        Ok(file) => attachment(file),
        Err(e) => errors::service_error_to_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_formats_by_path() {
        assert_eq!(parse_format("PDF"), Some(ReportFormat::Pdf));
        assert_eq!(parse_format("word"), Some(ReportFormat::Doc));
        assert_eq!(parse_format("csv"), Some(ReportFormat::Csv));
        assert_eq!(parse_format("odt"), None);
    }
}
