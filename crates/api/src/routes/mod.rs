//! # 路由控制器
//!
//! 每个子模块对应一组 REST 接口，Handler 只做参数提取与 DTO 转换。

pub mod market;
pub mod stock;
pub mod system;
