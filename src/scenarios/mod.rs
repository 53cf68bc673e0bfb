//! 基于内存曲库的端到端场景测试

mod engagement;
