//! Counter Demo
//!
//! Renders a small component tree to an HTML string in a single pass:
//! - A counter that settles its state through render-phase updates
//! - A themed label reading a context value
//! - A list whose formatted rows are memoized
//!
//! Run with: RUST_LOG=blinc_hooks=debug cargo run -p blinc_hooks --example counter

use blinc_hooks::{deps, ComponentId, Context, HookError, HooksConfig, HooksRuntime, RenderPhase, ThreadId};

struct CounterProps {
    target: u32,
}

fn counter(rt: &mut HooksRuntime, props: &CounterProps, _extra: &()) -> Result<String, HookError> {
    let (count, set_count) = rt.use_state(0u32)?;
    let renders = rt.use_ref(0u32)?;
    *renders.borrow_mut() += 1;

    // Count up to the target before the output is produced
    if count < props.target {
        set_count.update(rt, |n| n + 1)?;
    }

    rt.use_layout_effect(|| println!("never printed"), None);

    Ok(format!(
        "<span data-passes=\"{}\">{count}</span>",
        renders.borrow()
    ))
}

fn themed_label(
    rt: &mut HooksRuntime,
    props: &&'static str,
    theme: &Context<&'static str>,
) -> Result<String, HookError> {
    let theme = rt.use_context(*theme)?;
    Ok(format!("<label class=\"{theme}\">{props}</label>"))
}

fn item_list(rt: &mut HooksRuntime, items: &Vec<String>, _extra: &()) -> Result<String, HookError> {
    let (selected, set_selected) = rt.use_state(None::<usize>)?;
    let rows = rt.use_memo(
        || {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("<li data-index=\"{i}\">{item}</li>"))
                .collect::<Vec<_>>()
        },
        Some(deps![items.len()]),
    )?;

    if rt.phase() == RenderPhase::Rendering && !items.is_empty() {
        set_selected.set(rt, Some(0))?;
    }

    let selected = selected.map_or(String::from("none"), |i| i.to_string());
    Ok(format!("<ul data-selected=\"{selected}\">{}</ul>", rows.concat()))
}

fn main() -> Result<(), HookError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = HooksConfig::from_toml_str("re_render_limit = 10\nwarn_on_layout_effect = true\n")?;
    let mut rt = HooksRuntime::with_config(config);

    let theme = rt.contexts_mut().create_context("light");
    let thread = ThreadId(1);
    rt.set_current_thread_id(thread);
    rt.contexts_mut().push_provider(theme, thread, "dark")?;

    let mut html = String::from("<div>");

    let id = rt.next_component_id();
    html += &rt.render(id, counter, &CounterProps { target: 3 }, &())?;

    let id = rt.next_component_id();
    html += &rt.render(id, themed_label, &"Items", &theme)?;

    let id = rt.next_component_id();
    let items = vec![String::from("alpha"), String::from("beta")];
    html += &rt.render(id, item_list, &items, &())?;

    rt.contexts_mut().pop_provider(theme, thread);
    rt.contexts_mut().reset_thread(thread);

    html += "</div>";
    println!("{html}");

    // A runaway component is stopped by the replay limit
    let runaway = rt.render(
        ComponentId::from_raw(u64::MAX),
        |rt, _: &(), _: &()| {
            let (n, set_n) = rt.use_state(0u64)?;
            set_n.set(rt, n + 1)?;
            Ok(n)
        },
        &(),
        &(),
    );
    if let Err(err) = runaway {
        tracing::warn!("{err}");
    }

    Ok(())
}
