//! hudkit demo
//!
//! Builds a small main menu, styles it with a stylesheet (a file given on
//! the command line or the built-in one), runs one frame and prints the
//! resulting rectangles.

use std::env;
use std::process;

use hudkit::{EngineConfig, NAME, Panel, PanelId, PanelKind, StyleSheet, UiContext, VERSION};
use serde_json::{Value, json};

const BUILTIN_SHEET: &str = r#"
#Menu {
    flow-children: down;
    width: 320px;
    padding: 16px;
    horizontal-align: center;
    vertical-align: center;
    background-color: rgba(10, 12, 20, 0.85);
    border-radius: 8px;
}
#Title { font-size: 32px; margin-bottom: 24px; horizontal-align: center; }
Button {
    width: fill-parent-flow;
    height: 48px;
    margin-bottom: 8px;
    background-color: #2a3142;
    transition: background-color 0.2s ease-out;
}
Button:hover { background-color: #3d4760; }
"#;

struct Options {
    json: bool,
    stylesheet: Option<String>,
}

fn parse_args() -> Options {
    let mut options = Options {
        json: false,
        stylesheet: None,
    };
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => options.json = true,
            "--help" | "-h" => {
                println!("usage: hudkit [--json] [stylesheet.css]");
                process::exit(0);
            }
            _ => options.stylesheet = Some(arg),
        }
    }
    options
}

fn build_menu(ctx: &mut UiContext) -> hudkit::Result<()> {
    let root = ctx.root();
    let tree = ctx.tree_mut();
    let menu = tree.add(root, Panel::default().with_id("Menu"))?;
    tree.add(menu, Panel::new(PanelKind::label("Main Menu")).with_id("Title"))?;
    for name in ["Play", "Options", "Quit"] {
        tree.add(menu, Panel::new(PanelKind::button(name)).with_id(name))?;
    }
    Ok(())
}

fn describe(ctx: &UiContext, id: PanelId) -> Option<Value> {
    let panel = ctx.tree().get(id)?;
    let rect = panel.bounds();
    let children: Vec<Value> = panel
        .children()
        .iter()
        .filter_map(|&child| describe(ctx, child))
        .collect();
    Some(json!({
        "element": panel.element_name(),
        "id": panel.id(),
        "rect": [rect.x, rect.y, rect.width, rect.height],
        "children": children,
    }))
}

fn print_tree(ctx: &UiContext, id: PanelId, depth: usize) {
    let Some(panel) = ctx.tree().get(id) else {
        return;
    };
    let rect = panel.bounds();
    println!(
        "{:indent$}{}#{}  ({}, {}) {}x{}",
        "",
        panel.element_name(),
        panel.id(),
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        indent = depth * 2
    );
    for &child in panel.children() {
        print_tree(ctx, child, depth + 1);
    }
}

fn run(options: &Options) -> hudkit::Result<()> {
    let mut ctx = UiContext::new(EngineConfig::default().with_viewport(1280.0, 720.0));
    match &options.stylesheet {
        Some(path) => ctx.load_stylesheet(path)?,
        None => ctx.add_stylesheet(StyleSheet::parse(BUILTIN_SHEET)),
    }
    build_menu(&mut ctx)?;
    let stats = ctx.update(0.0);

    if options.json {
        let output = json!({
            "name": NAME,
            "version": VERSION,
            "stats": {
                "styles_recomputed": stats.styles_recomputed,
                "panels_laid_out": stats.panels_laid_out,
            },
            "tree": describe(&ctx, ctx.root()),
        });
        println!("{output:#}");
    } else {
        println!("{NAME} v{VERSION}");
        println!(
            "{} panel(s) styled, {} laid out",
            stats.styles_recomputed, stats.panels_laid_out
        );
        print_tree(&ctx, ctx.root(), 0);
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let options = parse_args();
    if let Err(e) = run(&options) {
        eprintln!("{NAME}: {e}");
        process::exit(1);
    }
}
