mod execution;
mod input_coercion;
mod introspection;
mod operation_selection;
mod schema_build;
mod sdl;
