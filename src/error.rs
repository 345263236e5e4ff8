use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("无法读写文件 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误 {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("无法加载OBJ文件: {0}")]
    Obj(#[from] obj::ObjError),

    #[error("模型 {0} 中没有可用的三角形")]
    EmptyMesh(PathBuf),

    #[error("图片保存失败: {0}")]
    Image(#[from] image::ImageError),

    #[error("窗口错误: {0}")]
    Window(#[from] minifb::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
