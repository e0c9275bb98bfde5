//! 业务服务层
//!
//! 每个领域一个 Service 结构，按操作拆分文件。服务从请求的
//! app_data 取存储句柄，返回已封装好的 HttpResponse。

pub mod assignments;
pub mod evaluations;

pub use assignments::AssignmentService;
pub use evaluations::EvaluationService;
