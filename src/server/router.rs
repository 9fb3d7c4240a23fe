//! Request routing and the users API handlers.

use log::debug;
use tokio::sync::RwLock;

use crate::parser::{HttpRequest, Method};
use crate::server::error::Error;
use crate::server::negotiate::{escape_html, Representation};
use crate::server::response::{HttpResponse, StatusCode};
use crate::server::users::{User, UserStore};

/// The routes the server knows, resolved from method and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `POST /users`
    CreateUser,
    /// `GET /users`
    ListUsers,
    /// `GET /users/{id}`, id kept as the all-digit path segment.
    GetUser(String),
}

impl Route {
    /// Match a method and path against the route table.
    ///
    /// A known path with an unsupported method is
    /// [`Error::MethodNotAllowed`]; anything else unmatched is
    /// [`Error::RouteNotFound`].
    pub fn resolve(method: &Method, path: &str) -> Result<Route, Error> {
        if path == "/users" {
            return match method {
                Method::POST => Ok(Route::CreateUser),
                Method::GET => Ok(Route::ListUsers),
                _ => Err(Error::MethodNotAllowed {
                    method: method.clone(),
                    path: path.to_string(),
                    allowed: vec![Method::GET, Method::POST],
                }),
            };
        }

        if let Some(id) = path.strip_prefix("/users/") {
            if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
                return match method {
                    Method::GET => Ok(Route::GetUser(id.to_string())),
                    _ => Err(Error::MethodNotAllowed {
                        method: method.clone(),
                        path: path.to_string(),
                        allowed: vec![Method::GET],
                    }),
                };
            }
        }

        Err(Error::RouteNotFound(path.to_string()))
    }
}

/// Dispatches requests and owns the user store.
///
/// The store sits behind a lock so the router can be shared between
/// connection tasks.
#[derive(Debug, Default)]
pub struct Router {
    users: RwLock<UserStore>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a request and run its handler.
    pub async fn handle(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let route = Route::resolve(request.method(), request.path()?)?;
        debug!("Resolved {} {} to {route:?}", request.method(), request.target());

        match route {
            Route::CreateUser => self.create_user(request).await,
            Route::ListUsers => self.list_users(request).await,
            Route::GetUser(id) => self.get_user(request, &id).await,
        }
    }

    async fn create_user(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let form = request.form();
        let field = |name: &'static str| -> Result<String, Error> {
            if let Some(value) = request.get_query_param(name)? {
                return Ok(value.to_string());
            }
            form.as_ref()
                .and_then(|form| form.get(name))
                .and_then(|values| values.first())
                .cloned()
                .ok_or(Error::MissingField(name))
        };

        let name = field("name")?;
        let age = field("age")?;

        let mut users = self.users.write().await;
        let user = users.insert(name, age);
        debug!("Created user #{id}", id = user.id);

        Ok(HttpResponse::new(StatusCode::NoContent))
    }

    async fn list_users(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let representation = Representation::negotiate(request.headers().get_all("Accept"))?;
        let users = self.users.read().await;

        let body = match representation {
            Representation::Html => {
                let mut html = String::from("<html><head></head><body>");
                html.push_str(&format!("<div>Users ({})</div>", users.len()));
                html.push_str("<ul>");
                for user in users.all().values() {
                    html.push_str(&format!("<li>{}</li>", describe_html(user)));
                }
                html.push_str("</ul>");
                html.push_str("</body></html>");
                html.into_bytes()
            }
            Representation::Json => serde_json::to_vec(users.all())?,
        };

        Ok(HttpResponse::new(StatusCode::Ok)
            .with_content_type(representation.content_type())
            .with_body_bytes(body))
    }

    async fn get_user(&self, request: &HttpRequest, id: &str) -> Result<HttpResponse, Error> {
        // Accept is checked first, so a bad Accept is 406 even for missing ids.
        let representation = Representation::negotiate(request.headers().get_all("Accept"))?;
        let users = self.users.read().await;

        // An id too large for u64 cannot have been issued.
        let user = id
            .parse::<u64>()
            .ok()
            .and_then(|id| users.get(id))
            .ok_or_else(|| Error::UserNotFound(id.to_string()))?;

        let body = match representation {
            Representation::Html => {
                format!("<html><head></head><body>{}</body></html>", describe_html(user)).into_bytes()
            }
            Representation::Json => serde_json::to_vec(user)?,
        };

        Ok(HttpResponse::new(StatusCode::Ok)
            .with_content_type(representation.content_type())
            .with_body_bytes(body))
    }
}

fn describe_html(user: &User) -> String {
    format!("#{} {}, {}", user.id, escape_html(&user.name), escape_html(&user.age))
}
