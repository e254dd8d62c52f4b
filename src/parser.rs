pub mod dot_splat;
