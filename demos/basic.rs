//! Basic Example - a menu tree driving the pooled UI
//!
//! This example demonstrates the host loop:
//! - Building a scene with a panel view to anchor the menu to
//! - Creating and enabling the UI manager
//! - Mutating the menu tree and watching the page redraw
//! - Ticking so the page follows the panel view
//!
//! Run with: cargo run --example basic

use spark_menu::{
    MenuTree, PoolRole, Pose, Quat, Scene, StaticAssets, UiConfig, UiManager, Vec3,
};

fn main() -> spark_menu::Result<()> {
    println!("=== spark-menu Basic Example ===\n");

    let scene = Scene::shared();
    let panel = scene.borrow_mut().create_node("Panel View");
    let assets = StaticAssets::with_default_templates().with_panel_view(panel);
    let tree = MenuTree::new("BoneMenu");

    let mut manager = UiManager::new(
        scene.clone(),
        &assets,
        tree.events().clone(),
        UiConfig::default(),
    )?;
    manager.enable()?;

    println!("Pools after startup:");
    for role in PoolRole::ALL {
        let pool = manager.pool(role);
        println!(
            "  {:<8} {} spawnable, {} spawned",
            role.name(),
            pool.spawnable_count(),
            pool.spawned_count()
        );
    }

    // Build a small menu
    let root = tree.root();
    let player = root.create_category("Player");
    player.create_function("Heal", || println!("  -> healed"));
    player.create_toggle("God Mode", false);
    root.create_value("Gravity", -9.81);
    root.create_toggle("Slow Motion", false);

    tree.select_root();
    print_page(&manager, &scene);

    tree.select(&player);
    print_page(&manager, &scene);

    // Adding to the displayed category redraws it
    player.create_value("Max Health", 100.0);
    print_page(&manager, &scene);

    tree.back();
    print_page(&manager, &scene);

    // Host frames: move the panel, tick, the page follows
    println!("\nTicking:");
    for frame in 0..3 {
        let pose = Pose::new(
            Vec3::new(frame as f32 * 0.5, 1.5, -1.0),
            Quat::from_axis_angle(Vec3::Y, 0.2 * frame as f32),
        );
        scene.borrow_mut().set_local_pose(panel, pose)?;
        let moved = manager.tick();

        let page = manager.main_page().node();
        let position = scene.borrow().world_pose(page).map(|p| p.position);
        println!("  frame {frame}: moved={moved} page at {position:?}");
    }

    manager.disable();
    drop(manager);
    println!("\nNodes left after teardown: {}", scene.borrow().node_count());

    Ok(())
}

fn print_page(manager: &UiManager, scene: &spark_menu::SceneHandle) {
    let page = manager.main_page();
    let scene = scene.borrow();
    let title = page.assigned().map(|c| c.name().to_string()).unwrap_or_default();

    println!("\nPage \"{title}\" (draw #{}):", page.draw_count());
    for row in page.rows() {
        let label = scene.label(row.node).unwrap_or("?");
        println!("  [{:<8}] {}", row.role.name(), label);
    }
}
