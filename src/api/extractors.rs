// API 请求提取器
// 从 Bearer JWT 中解析调用者身份；令牌由外部身份服务签发

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::Utc;
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use studio_common::is_admin;
use tracing::debug;

use crate::errors::{StudioError, StudioResult};

/// JWT 声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID
    pub sub: String,
    /// 角色
    pub role: String,
    /// 过期时间（Unix 秒）
    pub exp: usize,
}

/// 令牌校验器（HS256）
#[derive(Clone)]
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> StudioResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// 签发令牌，供运维脚本和测试使用
    pub fn issue(&self, user_id: &str, role: &str, ttl: chrono::Duration) -> StudioResult<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: (Utc::now() + ttl).timestamp().max(0) as usize,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }
}

/// 已认证的调用者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub role: String,
}

impl UserContext {
    pub fn is_admin(&self) -> bool {
        is_admin(&self.role)
    }

    fn from_http(req: &HttpRequest) -> StudioResult<Self> {
        let verifier = req
            .app_data::<web::Data<TokenVerifier>>()
            .ok_or_else(|| StudioError::configuration("未注册令牌校验器"))?;

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| StudioError::authentication("缺少认证头"))?
            .strip_prefix("Bearer ")
            .ok_or_else(|| StudioError::authentication("无效的认证格式"))?;

        let claims = verifier.verify(token.trim())?;
        debug!(user_id = %claims.sub, role = %claims.role, "调用者已认证");

        Ok(Self {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

impl FromRequest for UserContext {
    type Error = StudioError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_http(req))
    }
}

/// 管理员调用者
#[derive(Debug, Clone)]
pub struct AdminUser(pub UserContext);

impl FromRequest for AdminUser {
    type Error = StudioError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = UserContext::from_http(req).and_then(|user| {
            if user.is_admin() {
                Ok(AdminUser(user))
            } else {
                Err(StudioError::authorization("需要管理员权限"))
            }
        });
        ready(result)
    }
}
