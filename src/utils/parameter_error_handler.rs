//! 请求参数反序列化错误的统一处理
//!
//! 查询参数与 JSON 体解析失败时返回 ApiResponse 错误体，
//! 而不是 actix 默认的纯文本响应。

use actix_web::{HttpRequest, HttpResponse, error};

use crate::models::{ApiResponse, ErrorCode};

pub fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> error::Error {
    let detail = err.to_string();
    error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::InvalidQueryParameter,
            format!("Invalid query parameter: {detail}"),
        )),
    )
    .into()
}

pub fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    let detail = err.to_string();
    error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::InvalidJsonBody,
            format!("Invalid JSON body: {detail}"),
        )),
    )
    .into()
}
