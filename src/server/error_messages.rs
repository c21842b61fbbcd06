//! Canned error pages
//!
//! Every page names the status, the thing that went wrong, and a longer
//! explanation, and is signed with the server name.

use crate::server::{Response, Status};

/// Builds the complete error response for `status`, blaming `cause`.
pub fn client_error(cause: &str, status: Status, long_msg: &str,
                    server_name: &str) -> Response {
    let mut body = String::new();
    body.push_str("<html><title>Tiny Error</title>");
    body.push_str("<body bgcolor=ffffff>\r\n");
    body.push_str(&format!("{}: {}\r\n", status.code, status.reason));
    body.push_str(&format!("<p>{}: {}\r\n", long_msg, html_escape(cause)));
    body.push_str(&format!("<hr><em>The {}</em>\r\n", html_escape(server_name)));

    let mut res = Response::new(status, server_name);
    res.headers_mut().insert("Connection", "close");
    res.headers_mut().insert("Content-type", "text/html");
    res.set_body(body.into_bytes());
    res
}

pub fn error_400(cause: &str, server_name: &str) -> Response {
    client_error(cause, Status::BAD_REQUEST,
                 "Tiny couldn't understand this request", server_name)
}

pub fn error_403_static(cause: &str, server_name: &str) -> Response {
    client_error(cause, Status::FORBIDDEN, "Tiny couldn't read this file",
                 server_name)
}

pub fn error_403_dynamic(cause: &str, server_name: &str) -> Response {
    client_error(cause, Status::FORBIDDEN, "Tiny couldn't run the CGI program",
                 server_name)
}

pub fn error_404(cause: &str, server_name: &str) -> Response {
    client_error(cause, Status::NOT_FOUND, "Tiny couldn't find this file",
                 server_name)
}

pub fn error_500(cause: &str, server_name: &str) -> Response {
    client_error(cause, Status::INTERNAL_ERROR,
                 "Tiny couldn't finish serving this file", server_name)
}

pub fn error_501(cause: &str, server_name: &str) -> Response {
    client_error(cause, Status::NOT_IMPLEMENTED,
                 "Tiny does not implement this method", server_name)
}

fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            ch => escaped.push(ch)
        }
    }
    escaped
}

#[cfg(test)]
mod test {
    use super::*;

    fn body_of(res: &Response) -> String {
        String::from_utf8(res.body().to_vec()).unwrap()
    }

    #[test]
    fn not_implemented_page() {
        let res = error_501("POST", "Tiny Web Server");
        assert_eq!(res.status(), Status::NOT_IMPLEMENTED);

        let body = body_of(&res);
        assert!(body.contains("501: Not implemented"));
        assert!(body.contains("Tiny does not implement this method: POST"));
        assert!(body.contains("<hr><em>The Tiny Web Server</em>"));
    }

    #[test]
    fn content_length_matches_body() {
        let res = error_404("./nope.html", "Tiny Web Server");
        let expected = res.body().len().to_string();
        assert_eq!(res.headers().get("content-length"),
                   Some(expected.as_str()));
        assert_eq!(res.headers().get("Content-type"), Some("text/html"));
        assert_eq!(res.headers().get("Connection"), Some("close"));
    }

    #[test]
    fn cause_is_escaped() {
        let res = error_404("./<script>.html", "Tiny Web Server");
        let body = body_of(&res);
        assert!(body.contains("./&lt;script&gt;.html"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn forbidden_pages_differ_by_kind() {
        assert!(body_of(&error_403_static("f", "s")).contains("couldn't read"));
        assert!(body_of(&error_403_dynamic("f", "s")).contains("couldn't run"));
        assert!(body_of(&error_403_static("f", "s")).contains("403: Forbidden"));
    }
}
