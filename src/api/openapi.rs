//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, catalog, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblios API",
        version = "0.1.0",
        description = "Library catalog REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        auth::create_user,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Books and copies
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::create_copy,
        books::delete_copy,
        // Catalog
        catalog::list_genres,
        catalog::create_genre,
        catalog::list_languages,
        catalog::create_language,
        catalog::summary,
        // Loans
        loans::my_loans,
        loans::all_loans,
        loans::renewal_form,
        loans::renew_copy,
        loans::borrow_copy,
        loans::return_copy,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::CreateUser,
            // Authors
            crate::models::author::Author,
            crate::models::author::AuthorDetails,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Books
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookDetails,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::Genre,
            crate::models::book::Language,
            crate::models::book::CreateGenre,
            crate::models::book::CreateLanguage,
            // Copies and loans
            crate::models::copy::BookCopy,
            crate::models::copy::CopyStatus,
            crate::models::copy::CreateCopy,
            crate::models::copy::LoanDetails,
            loans::RenewalProposal,
            loans::RenewRequest,
            loans::BorrowRequest,
            // Catalog
            crate::services::catalog::LibrarySummary,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and users"),
        (name = "authors", description = "Author catalog management"),
        (name = "books", description = "Book and copy catalog management"),
        (name = "catalog", description = "Genres, languages, summary"),
        (name = "loans", description = "Loan and renewal management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
