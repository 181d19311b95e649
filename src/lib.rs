//! Windia FAQ Bot - 聊天平台 FAQ 命令核心
//!
//! 模块划分：
//! - **bot**: 无头消息运行时（单条消息从解析到投递的闭环）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **dispatch**: 单飞行调度队列（严格 FIFO，固定节拍逐条投递）
//! - **faq**: FAQ 核心（存储、模糊匹配、解析协议、管理命令）
//! - **observability**: 日志初始化
//! - **platform**: 聊天平台协作方接口（投递、权限、内置命令集）

pub mod bot;
pub mod config;
pub mod dispatch;
pub mod faq;
pub mod observability;
pub mod platform;
