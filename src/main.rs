mod camera;
mod config;
mod error;
mod framebuffer;
mod input;
mod light;
mod model;
mod panel;
mod primitives;
mod rasterizer;
mod renderer;
mod scene;
mod vertex;
mod viewer;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::ViewerSettings;
use crate::renderer::Renderer;
use crate::scene::Scene;
use crate::viewer::Viewer;

const DEFAULT_SETTINGS: &str = "settings.json";

#[derive(Parser, Debug)]
#[command(name = "scene-viewer")]
#[command(about = "软光栅场景查看器：地面、立方体、圆柱、圆环和兔子")]
struct Cli {
    /// 场景参数 json，按 S 保存到这里
    #[arg(long)]
    config: Option<PathBuf>,

    /// 换一个兔子 OBJ 模型，默认用内置的；读不了时用球体代替
    #[arg(long)]
    bunny: Option<PathBuf>,

    #[arg(long, default_value_t = 1024)]
    width: usize,

    #[arg(long, default_value_t = 720)]
    height: usize,

    /// 不开窗口，渲染一帧保存为 PNG 后退出
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// 截图的超采样倍数
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=8))]
    ssaa: u32,
}

fn load_settings(path: &Path) -> anyhow::Result<ViewerSettings> {
    if path.exists() {
        Ok(ViewerSettings::load(path)?)
    } else {
        tracing::info!("{} 不存在，使用默认参数", path.display());
        Ok(ViewerSettings::default())
    }
}

fn render_snapshot(
    scene: &Scene,
    mut settings: ViewerSettings,
    width: usize,
    height: usize,
    ssaa: u32,
    out: &Path,
) -> anyhow::Result<()> {
    let factor = ssaa.max(1) as usize;
    settings.camera.set_aspect(width, height);

    let mut renderer = Renderer::new(width * factor, height * factor);
    let stats = renderer.render_scene(scene, &settings);
    tracing::info!(?stats, "离屏渲染完成");

    renderer
        .framebuffer()
        .ssaa(factor)
        .save_to_image(out)
        .with_context(|| format!("无法保存 {}", out.display()))?;
    tracing::info!("已保存 {}", out.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    if cli.width == 0 || cli.height == 0 {
        anyhow::bail!("窗口大小必须大于 0");
    }

    let settings_path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS));
    let settings = load_settings(&settings_path)?;
    let scene = Scene::load(cli.bunny.as_deref());
    tracing::info!("场景共 {} 个三角形", scene.triangle_count());

    if let Some(out) = cli.snapshot {
        return render_snapshot(&scene, settings, cli.width, cli.height, cli.ssaa, &out);
    }

    Viewer::new(scene, settings, settings_path, cli.width, cli.height)
        .run()
        .context("窗口运行失败")
}
