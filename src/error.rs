use thiserror::Error;

/// 与外部播放器交互过程中的错误
#[derive(Error, Debug)]
pub enum PlayerError {
    /// 外部命令已运行，但以非零状态退出
    #[error("外部命令 {argv:?} 执行失败 (退出码: {exit_code:?}): {output}")]
    ExternalCommand {
        argv: Vec<String>,
        /// 被信号终止时为 None
        exit_code: Option<i32>,
        output: String,
    },

    /// 外部命令无法启动（通常是程序未安装）
    #[error("无法启动外部命令 {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// 结构化输出中缺少必需字段
    #[error("输出中未找到字段 {key}")]
    FieldNotFound { key: String },
}

pub type Result<T> = std::result::Result<T, PlayerError>;
