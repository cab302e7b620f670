//! Workspace-level tooling package (pre-commit hooks); contains no code.
