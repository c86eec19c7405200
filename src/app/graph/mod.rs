mod frame;
mod interaction;
mod view;

pub(in crate::app) use view::GraphView;
