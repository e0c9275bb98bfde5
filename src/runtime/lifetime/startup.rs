use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::models::rubrics::entities::{
    RubricCategory, RubricItem, RubricSubCategory, ScoreDescription,
};
use crate::models::rubrics::requests::CreateRubricTemplateRequest;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 默认量表模板名称，启动种子与测试共用
pub const DEFAULT_TEMPLATE_NAME: &str = "SKPMg2 Standard 4 PdP";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 创建缓存实例
async fn create_cache() -> Result<Arc<dyn ObjectCache>, Box<dyn std::error::Error>> {
    let config = AppConfig::get();
    let cache_type = &config.cache.cache_type;

    warn!("Attempting to create {} cache backend", cache_type);

    // 根据配置选择缓存后端
    if let Some(constructor) = get_object_cache_plugin(cache_type) {
        match constructor().await {
            Ok(cache) => {
                warn!("Successfully created {} cache backend", cache_type);
                return Ok(Arc::from(cache));
            }
            Err(e) => {
                warn!("Failed to create {} cache: {}", cache_type, e);

                // 如果配置的缓存失败，尝试回退策略
                if cache_type == "redis" {
                    warn!("Falling back to memory cache");
                    if let Some(fallback_constructor) = get_object_cache_plugin("moka") {
                        match fallback_constructor().await {
                            Ok(cache) => {
                                warn!(
                                    "Successfully created fallback Moka (in-memory) cache backend"
                                );
                                return Ok(Arc::from(cache));
                            }
                            Err(fallback_e) => {
                                warn!("Failed to create fallback Moka cache: {}", fallback_e);
                            }
                        }
                    }
                }
            }
        }
    } else {
        warn!("Cache backend '{}' not found in registry", cache_type);

        // 如果找不到配置的缓存类型，尝试默认的内存缓存
        if cache_type != "moka" {
            warn!("Falling back to default memory cache");
            if let Some(fallback_constructor) = get_object_cache_plugin("moka") {
                match fallback_constructor().await {
                    Ok(cache) => {
                        warn!("Successfully created fallback Moka (in-memory) cache backend");
                        return Ok(Arc::from(cache));
                    }
                    Err(fallback_e) => {
                        warn!("Failed to create fallback Moka cache: {}", fallback_e);
                    }
                }
            }
        }
    }

    Err(format!("No cache backend available (tried: {cache_type})").into())
}

/// 生成随机密码
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// 初始化默认管理员账号
/// 如果数据库中没有任何用户，则创建一个默认的 admin 账号
async fn seed_admin(storage: &Arc<dyn Storage>) {
    // 检查是否已有用户
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!("Database already has {} user(s), skipping admin seed", count);
            return;
        }
        Ok(_) => {
            info!("No users found in database, creating default admin account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return;
        }
    }

    // 获取密码：优先从环境变量，否则生成随机密码
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    // 哈希密码
    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping admin seed", e);
            return;
        }
    };

    // 创建管理员账号
    let admin_request = CreateUserRequest {
        username: "admin".to_string(),
        email: "admin@localhost".to_string(),
        password: password_hash,
        role: UserRole::Admin,
        display_name: Some("Administrator".to_string()),
    };

    match storage.create_user(admin_request).await {
        Ok(user) => {
            info!(
                "Default admin account created successfully (ID: {}, username: {})",
                user.id, user.username
            );
        }
        Err(e) => {
            warn!("Failed to create admin account: {}", e);
        }
    }
}

/// SKPMg2 通用评分等级：0-4 分，每档附带说明
fn default_score_levels() -> Vec<ScoreDescription> {
    let levels = [
        (4, "Cemerlang", "Dilaksanakan dengan cemerlang mengikut semua kriteria"),
        (3, "Baik", "Dilaksanakan dengan baik mengikut kebanyakan kriteria"),
        (2, "Memuaskan", "Dilaksanakan pada tahap memuaskan dengan sebahagian kriteria"),
        (1, "Lemah", "Dilaksanakan pada tahap minimum"),
        (0, "Sangat Lemah", "Tidak dilaksanakan"),
    ];
    levels
        .into_iter()
        .map(|(score, label, description)| ScoreDescription {
            score,
            label: label.to_string(),
            description: description.to_string(),
        })
        .collect()
}

fn rubric_item(id: &str, text: &str) -> RubricItem {
    RubricItem {
        id: id.to_string(),
        text: text.to_string(),
        max_score: 4,
        score_descriptions: default_score_levels(),
    }
}

/// SKPMg2 标准4（PdP）默认模板：六个子类别，权重之和 100
fn default_rubric_request() -> CreateRubricTemplateRequest {
    let sub_categories = vec![
        RubricSubCategory {
            code: "4.1".to_string(),
            name: "Guru Sebagai Perancang".to_string(),
            items: vec![rubric_item(
                "4.1.1",
                "Guru merancang pelaksanaan PdP secara profesional dan sistematik",
            )],
        },
        RubricSubCategory {
            code: "4.2".to_string(),
            name: "Guru Sebagai Pengawal".to_string(),
            items: vec![
                rubric_item("4.2.1", "Guru mengawal proses pembelajaran secara terancang"),
                rubric_item("4.2.2", "Guru mengawal suasana pembelajaran secara berkesan"),
            ],
        },
        RubricSubCategory {
            code: "4.3".to_string(),
            name: "Guru Sebagai Pembimbing".to_string(),
            items: vec![rubric_item(
                "4.3.1",
                "Guru membimbing murid secara profesional dan terancang",
            )],
        },
        RubricSubCategory {
            code: "4.4".to_string(),
            name: "Guru Sebagai Pendorong".to_string(),
            items: vec![
                rubric_item(
                    "4.4.1",
                    "Guru mendorong minda murid dalam melaksanakan aktiviti pembelajaran",
                ),
                rubric_item(
                    "4.4.2",
                    "Guru mendorong emosi murid dalam melaksanakan aktiviti pembelajaran",
                ),
            ],
        },
        RubricSubCategory {
            code: "4.5".to_string(),
            name: "Guru Sebagai Penilai".to_string(),
            items: vec![rubric_item(
                "4.5.1",
                "Guru melaksanakan penilaian secara sistematik dan terancang",
            )],
        },
        RubricSubCategory {
            code: "4.6".to_string(),
            name: "Murid Sebagai Pembelajar Aktif".to_string(),
            items: vec![rubric_item(
                "4.6.1",
                "Murid melibatkan diri dalam proses pembelajaran secara berkesan",
            )],
        },
    ];

    let weights: HashMap<String, f64> = HashMap::from([
        ("4.1".to_string(), 10.0),
        ("4.2".to_string(), 10.0),
        ("4.3".to_string(), 20.0),
        ("4.4".to_string(), 20.0),
        ("4.5".to_string(), 20.0),
        ("4.6".to_string(), 20.0),
    ]);

    CreateRubricTemplateRequest {
        name: DEFAULT_TEMPLATE_NAME.to_string(),
        version: 1,
        categories: vec![RubricCategory {
            code: "S4".to_string(),
            name: "Pembelajaran dan Pemudahcaraan".to_string(),
            sub_categories,
        }],
        weights,
    }
}

/// 初始化默认量表模板
/// 按名称查找，不存在则创建
async fn seed_default_rubric(storage: &Arc<dyn Storage>) {
    match storage.get_rubric_template_by_name(DEFAULT_TEMPLATE_NAME).await {
        Ok(Some(template)) => {
            debug!(
                "Default rubric template already present (ID: {}, version: {})",
                template.id, template.version
            );
            return;
        }
        Ok(None) => {
            info!("Default rubric template not found, seeding...");
        }
        Err(e) => {
            warn!("Failed to look up default rubric template: {}, skipping seed", e);
            return;
        }
    }

    match storage.create_rubric_template(default_rubric_request()).await {
        Ok(template) => {
            if let Err(msg) = template.validate_weights() {
                warn!("Seeded rubric template has invalid weights: {}", msg);
            }
            info!(
                "Default rubric template seeded (ID: {}, name: {})",
                template.id, template.name
            );
        }
        Err(e) => {
            warn!("Failed to seed default rubric template: {}", e);
        }
    }
}

/// 准备服务器启动的上下文
/// 包括存储、缓存和种子数据等
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    // 初始化默认管理员账号（如果需要）
    seed_admin(&storage).await;

    // 初始化默认量表模板（如果需要）
    seed_default_rubric(&storage).await;

    // 创建缓存实例
    let cache = create_cache().await.expect("Failed to create cache");
    warn!("Cache backend initialized");

    StartupContext { storage, cache }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rubric_weights_are_consistent() {
        let request = default_rubric_request();
        let sum: f64 = request.weights.values().sum();
        assert!((sum - 100.0).abs() < 1e-9);

        for category in &request.categories {
            for sub in &category.sub_categories {
                assert!(request.weights.contains_key(&sub.code));
                assert!(!sub.items.is_empty());
            }
        }
    }

    #[test]
    fn test_default_rubric_items_carry_score_levels() {
        let request = default_rubric_request();
        for category in &request.categories {
            for sub in &category.sub_categories {
                for item in &sub.items {
                    let scores: Vec<i32> =
                        item.score_descriptions.iter().map(|d| d.score).collect();
                    // 每个条目必须覆盖 0..=max_score 的全部分值
                    for score in 0..=item.max_score {
                        assert!(
                            scores.contains(&score),
                            "item {} missing score level {}",
                            item.id,
                            score
                        );
                    }
                    for desc in &item.score_descriptions {
                        assert!(!desc.label.is_empty());
                        assert!(!desc.description.is_empty());
                    }
                }
            }
        }
    }

    #[test]
    fn test_generate_random_password_length() {
        let pwd = generate_random_password(16);
        assert_eq!(pwd.len(), 16);
    }
}
