// 通用字符串工具

mod string;

pub use string::*;
