use crate::api::error::AppError;
use crate::entities::{files, prelude::*};
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, Condition, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder};

use super::types::*;

#[utoipa::path(
    get,
    path = "/files",
    params(
        ("page" = Option<u64>, Query, description = "Page number, 1-based"),
        ("limit" = Option<u64>, Query, description = "Page size, max 100"),
        ("search" = Option<String>, Query, description = "Substring match on name and description"),
        ("sortBy" = Option<String>, Query, description = "created_at | filename | size | download_count"),
        ("sortOrder" = Option<String>, Query, description = "asc | desc")
    ),
    responses(
        (status = 200, description = "Files retrieved successfully", body = ListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn list_files(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let mut select = Files::find().filter(files::Column::OwnerId.eq(&claims.sub));

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        select = select.filter(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(files::Column::Filename))).like(&pattern))
                .add(
                    Expr::expr(Func::lower(Expr::col(files::Column::OriginalName)))
                        .like(&pattern),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(files::Column::Description)))
                        .like(&pattern),
                ),
        );
    }

    // Only whitelisted columns are sortable
    let sort_column = match query.sort_by.as_deref() {
        Some("filename") => files::Column::Filename,
        Some("size") => files::Column::Size,
        Some("download_count") => files::Column::DownloadCount,
        _ => files::Column::CreatedAt,
    };
    let sort_order = match query.sort_order.as_deref() {
        Some("asc") => Order::Asc,
        _ => Order::Desc,
    };

    let paginator = select
        .order_by(sort_column, sort_order)
        .paginate(&state.db, limit);

    let total_files = paginator.num_items().await?;
    let total_pages = total_files.div_ceil(limit).max(1);
    let current_page = page.min(total_pages);

    let files = paginator
        .fetch_page(current_page - 1)
        .await?
        .into_iter()
        .map(|f| FileResponse::from_model(f, &state.config))
        .collect();

    Ok(Json(ListResponse {
        files,
        pagination: Pagination {
            current_page,
            total_pages,
            total_files,
            has_next_page: current_page < total_pages,
            has_prev_page: current_page > 1,
        },
    }))
}
