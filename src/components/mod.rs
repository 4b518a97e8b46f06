pub mod task_graph;
