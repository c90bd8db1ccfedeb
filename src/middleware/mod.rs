/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (request gate), http (request-id/trace/limit/timeout), security_headers
 */
pub mod auth;
pub mod http;
pub mod security_headers;
