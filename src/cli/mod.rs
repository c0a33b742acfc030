use clap::Parser;

pub mod dispatcher;
pub mod handlers;

const HELP_TEMPLATE: &str = "\
<title>repodeck</title> {version}
One-line status for many git repos, and commands fanned out across them.

<title>USAGE</title>
  <cmd>repodeck</cmd> <hl><action></hl> [args...]

<group>REGISTRY</group>
  <cmd>add</cmd> [-r] <path>...       Register repos (recursively with -r)
  <cmd>rm</cmd> <name>...             Unregister repos
  <cmd>rename</cmd> <old> <new>       Rename a repo
  <cmd>ls</cmd> [name]                List repo names, or print one repo's path

<group>STATUS</group>
  <cmd>ll</cmd> [name|group]...       One status line per repo
                            <dim>markers: * dirty, + untracked; red = dirty, green = clean</dim>

<group>GROUPS & CONTEXT</group>
  <cmd>group</cmd> ls|add|rm          Manage named sets of repos
  <cmd>context</cmd> [group|none]     Show or set the group used when no names are given

<group>RUNNING COMMANDS</group>
  <cmd>super</cmd> [names] -- <git args>   Run a git command in every selected repo
  <cmd>shell</cmd> [names] -- <command>    Run a shell command in every selected repo
  <cmd>cmds</cmd>                          List predefined commands (e.g. <cmd>fetch</cmd>, <cmd>st</cmd>)
  <cmd><predefined></cmd> [names] [-- args]

<dim>Set RUST_LOG=debug for diagnostics.</dim>
";

/// Builds the color-aware help string at runtime.
fn build_help_string() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();

    let title = if use_colors { "\x1b[1;33m" } else { "" }; // Bold Yellow
    let hl = if use_colors { "\x1b[1;36m" } else { "" }; // Bold Cyan
    let cmd = if use_colors { "\x1b[36m" } else { "" }; // Cyan
    let group = if use_colors { "\x1b[1;32m" } else { "" }; // Bold Green
    let dim = if use_colors { "\x1b[2m" } else { "" };
    let reset = if use_colors { "\x1b[0m" } else { "" };

    let formatted_string = HELP_TEMPLATE
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<hl>", hl)
        .replace("</hl>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<group>", group)
        .replace("</group>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    Box::leak(formatted_string.into_boxed_str())
}

/// repodeck: a dashboard for many git working trees.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
)]
#[command(disable_help_subcommand = true)]
#[command(trailing_var_arg = true)]
pub struct Cli {
    /// The action followed by its arguments; each handler parses its own.
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}
