//! 路径参数安全提取器
//!
//! 直接用 web::Path<i64> 时解析失败会返回 actix 默认的纯文本 404/400，
//! 这里统一换成 ApiResponse 错误体，并拒绝非正数 ID。

use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorBadRequest};
use std::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

macro_rules! declare_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
                let parsed = req
                    .match_info()
                    .get($param)
                    .and_then(|raw| raw.parse::<i64>().ok())
                    .filter(|id| *id > 0);

                ready(match parsed {
                    Some(id) => Ok($name(id)),
                    None => Err(ErrorBadRequest(
                        serde_json::to_string(&ApiResponse::error_empty(
                            ErrorCode::BadRequest,
                            format!("Invalid path parameter: {}", $param),
                        ))
                        .unwrap_or_default(),
                    )),
                })
            }
        }
    };
}

declare_safe_i64_extractor!(SafeIDI64, "id");
