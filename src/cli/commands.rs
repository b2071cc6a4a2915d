use clap::Subcommand;

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in to a server and store the session
    Login {
        /// Server URL
        #[arg(long)]
        server: Option<String>,

        /// Account email
        #[arg(long)]
        email: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show the signed-in account
    Whoami,
}

#[derive(Subcommand)]
pub enum WorkspaceCommands {
    /// List your workspaces
    List,

    /// Create a workspace
    Create {
        /// Workspace name
        name: Option<String>,
    },

    /// Rename a workspace
    Rename {
        /// Workspace to rename (picked interactively if omitted)
        workspace: Option<String>,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Delete a workspace and everything in it
    Delete {
        /// Workspace to delete (picked interactively if omitted)
        workspace: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum FolderCommands {
    /// Create a folder
    Create {
        /// Folder name
        name: Option<String>,

        /// Workspace name (picked interactively if omitted)
        #[arg(short, long)]
        workspace: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Delete an empty folder
    Delete {
        /// Folder to delete (picked interactively if omitted)
        folder: Option<String>,

        /// Workspace name (picked interactively if omitted)
        #[arg(short, long)]
        workspace: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum FileCommands {
    /// Create a file
    New {
        /// File title
        title: Option<String>,

        /// Workspace name (picked interactively if omitted)
        #[arg(short, long)]
        workspace: Option<String>,

        /// Folder to create the file in (workspace root if omitted)
        #[arg(short, long)]
        folder: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Print a file's content
    Cat {
        /// File title (picked interactively if omitted)
        file: Option<String>,

        /// Workspace name (picked interactively if omitted)
        #[arg(short, long)]
        workspace: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Move a file into a folder or back to the workspace root
    Mv {
        /// File title (picked interactively if omitted)
        file: Option<String>,

        /// Target folder name
        #[arg(short, long)]
        folder: Option<String>,

        /// Move to the workspace root instead of a folder
        #[arg(long, conflicts_with = "folder")]
        root: bool,

        /// Workspace name (picked interactively if omitted)
        #[arg(short, long)]
        workspace: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Delete a file
    Rm {
        /// File title (picked interactively if omitted)
        file: Option<String>,

        /// Workspace name (picked interactively if omitted)
        #[arg(short, long)]
        workspace: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Replace a file's content through the autosave engine
    Write {
        /// File title (picked interactively if omitted)
        file: Option<String>,

        /// New content (read from stdin if omitted)
        #[arg(long)]
        content: Option<String>,

        /// Workspace name (picked interactively if omitted)
        #[arg(short, long)]
        workspace: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },
}
